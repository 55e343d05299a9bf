pub mod classroom;
pub mod core;
pub mod exchange;
pub mod grouping;
pub mod history;
pub mod seating;
pub mod students;
