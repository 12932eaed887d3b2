#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    User,
    Subject,
    Lesson,
    Quiz,
    UserProgress,
}

pub trait ResourceTyped {
    fn get_resource_type() -> ResourceType;
}
