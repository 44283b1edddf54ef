mod test_array_basic;
mod test_compose_basic;
