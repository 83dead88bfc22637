pub mod test_collector;
