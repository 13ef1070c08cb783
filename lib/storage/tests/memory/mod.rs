mod resolution;
mod store;
mod test_utils;
