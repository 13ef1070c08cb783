mod append;
mod join;
mod negate;
mod optional;
mod ordering;
mod project;
mod subtract;
mod test_utils;
