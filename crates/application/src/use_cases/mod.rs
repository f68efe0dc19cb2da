pub mod quadrant_sweep_service;
