/// Aggregated view of set progress, useful for progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total_sets: u32,
    pub sets_completed: u32,
    pub remaining_sets: u32,
    pub is_complete: bool,
}
