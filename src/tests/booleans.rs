use crate::runtime::bridge::HostType;
use crate::runtime::error::RuntimeError;
use crate::runtime::machine::Machine;

#[test]
fn basic_boolean() {
    let mut m = Machine::new();

    let res = m.parse_and_eval("true").expect("eval");
    assert!(bool::from_value(&res).unwrap());

    for op1 in [true, false] {
        for op2 in [true, false] {
            let stmt = format!("{} || {}", op1, op2);
            let res = m.parse_and_eval(&stmt).expect(&stmt);
            assert_eq!(bool::from_value(&res).unwrap(), op1 || op2, "{}", stmt);

            let stmt = format!("{} && {}", op1, op2);
            let res = m.parse_and_eval(&stmt).expect(&stmt);
            assert_eq!(bool::from_value(&res).unwrap(), op1 && op2, "{}", stmt);
        }
    }
}

#[test]
fn boolean_operands_must_be_boolean() {
    let mut m = Machine::new();

    let err = m.parse_and_eval("1 && true").expect_err("should fail");
    assert!(
        matches!(err.root(), RuntimeError::TypeMismatch { .. }),
        "{err}"
    );

    let err = m.parse_and_eval("true && 1").expect_err("should fail");
    assert!(
        matches!(err.root(), RuntimeError::TypeMismatch { .. }),
        "{err}"
    );
}

// sanity check that pred() actually does what we think it does
#[test]
fn boolean_predicate_sanity() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func() {
		b := 0
		pred := func() {
			b++
			return true
		}

		if pred() {
			return b
		}

		return b
	}()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 1);
}

// the right side of && must not run when the left side is false
#[test]
fn and_short_circuits() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func() {
		b := 0
		pred := func() {
			b++
			return true
		}

		if false && pred() {
			return b
		}

		return b
	}()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 0);
}

// the right side of || must not run when the left side is true
#[test]
fn or_short_circuits() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func() {
		b := 0
		pred := func() {
			b++
			return true
		}

		if true || pred() {
			return b
		}

		return b
	}()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 0);
}
