pub mod news_provider;
pub mod simulation_provider;
