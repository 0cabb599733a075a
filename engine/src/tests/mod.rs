pub(crate) mod test_suite;
