pub mod analysis_service;
pub mod chart_data;
pub mod chart_surface;
pub mod formatting;
pub mod history_service;
pub mod interpretation_service;
pub mod recommendation_service;
pub mod report_compositor;
pub mod report_renderer;
pub mod result_adapter;
pub mod simulation_service;
pub mod suggestion_service;
