mod course_repository;
mod lesson_repository;
mod progress_repository;
mod question_repository;
mod user_repository;

pub use course_repository::CourseRepository;
pub use lesson_repository::LessonRepository;
pub use progress_repository::ProgressRepository;
pub use question_repository::QuestionRepository;
pub use user_repository::UserRepository;
