pub mod broadcasts;
pub mod procedures;
