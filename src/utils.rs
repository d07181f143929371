mod now;
pub use now::now;
