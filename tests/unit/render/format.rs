use super::*;

#[test]
fn groups_thousands() {
    assert_eq!(format_number(0.0), "0");
    assert_eq!(format_number(999.0), "999");
    assert_eq!(format_number(1000.0), "1,000");
    assert_eq!(format_number(1_234_567.6), "1,234,568");
    assert_eq!(format_number(100_000.0), "100,000");
}

#[test]
fn negatives_and_rounding() {
    assert_eq!(format_number(-1234.4), "-1,234");
    assert_eq!(format_number(-0.2), "0");
    assert_eq!(format_number(2.5), "3");
}
