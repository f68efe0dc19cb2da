pub mod use_cases;

pub use use_cases::quadrant_sweep_service::QuadrantSweepService;
