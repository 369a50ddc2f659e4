pub mod ghost_reader;
