use crate::runtime::bridge::HostType;
use crate::runtime::error::RuntimeError;
use crate::runtime::machine::Machine;

#[test]
fn conditionals_basic() {
    let mut m = Machine::new();

    let res = m
        .parse_and_eval(
            r#"
	func (A, B) {
		if (A>B) {
			return A
		} else {
			return B
		}
		return 1000000000
	} (1 ,2 )
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 2);

    let res = m
        .parse_and_eval(
            r#"
	func (A, B) {
		if (A < B) {
			A = B + 2
		}
		return A
	} ( 1 , 2)
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 4);
}

#[test]
fn conditionals_return_from_function() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func (A, B) {
		if A < B {
			return B
		}
		return A
	} (10, 1)
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 10);
}

// the init clause binds into the head frame, visible to both branches
#[test]
fn conditionals_assign() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func (A, B) {
		if n := A+B; n < 10 {
			return n
		} else {
			return B
		}
	} (1, 2)
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 3);
}

#[test]
fn else_if_chain() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func (n) {
		if n < 0 {
			return -1
		} else if n == 0 {
			return 0
		} else {
			return 1
		}
	} (0)
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 0);
}

#[test]
fn condition_must_be_boolean() {
    let mut m = Machine::new();
    let err = m
        .parse_and_eval("func() { if 1 { return 1 }; return 2 }()")
        .expect_err("should fail");
    assert!(
        matches!(err.root(), RuntimeError::BadCondition { .. }),
        "{err}"
    );
}
