pub mod assessment;
pub mod attempt;
pub mod blog;
pub mod skill;
pub mod user;
