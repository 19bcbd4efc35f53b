pub mod arrangement;
pub mod credential;
pub mod employee;
