pub mod showcase_seed;
