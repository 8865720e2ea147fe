pub mod health;
pub mod history;
pub mod news;
pub mod reports;
pub mod simulations;
