pub mod cases;
pub mod deadlines;
pub mod documents;
pub mod intake;
pub mod rules;
