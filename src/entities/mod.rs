pub mod categories;
pub mod certificates;
pub mod chapters;
pub mod courses;
pub mod enrolled_courses;
pub mod question_options;
pub mod questions;
pub mod quizzes;
pub mod resources;
pub mod student_profiles;
pub mod teacher_profiles;
pub mod users;

pub use categories as category_entity;
pub use certificates as certificate_entity;
pub use chapters as chapter_entity;
pub use courses as course_entity;
pub use enrolled_courses as enrollment_entity;
pub use enrolled_courses::EnrollmentStatus;
pub use question_options as question_option_entity;
pub use questions as question_entity;
pub use quizzes as quiz_entity;
pub use resources as resource_entity;
pub use student_profiles as student_profile_entity;
pub use teacher_profiles as teacher_profile_entity;
pub use users as user_entity;
