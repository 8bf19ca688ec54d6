use crate::runtime::bridge::HostType;
use crate::runtime::error::RuntimeError;
use crate::runtime::machine::Machine;

// the for block and for statement contexts should be separate
#[test]
fn for_loop_context() {
    let mut m = Machine::new();

    let err = m
        .parse_and_eval(
            r#"
	func(a) {
		for i:= 0; i < b; i++ {
			b := 10
		}

		return 1000
	}(10)
	"#,
        )
        .expect_err("should have error");
    assert!(
        matches!(err.root(), RuntimeError::UnknownName { .. }),
        "{err}"
    );

    let err = m
        .parse_and_eval(
            r#"
	func(a) {
		for i:= 0; i < 10; i = i+b {
			b := 10
		}

		return 1000
	}(10)
	"#,
        )
        .expect_err("should have error");
    assert!(
        matches!(err.root(), RuntimeError::UnknownName { .. }),
        "{err}"
    );
}

// the if block and if statement contexts should be separate
#[test]
fn if_stmt_context() {
    let mut m = Machine::new();
    let err = m
        .parse_and_eval(
            r#"
	func(a) {
		if a < b {
			b := 10
			return 1000
		}

		return 1000
	}(10)
	"#,
        )
        .expect_err("should have error");
    assert!(
        matches!(err.root(), RuntimeError::UnknownName { .. }),
        "{err}"
    );
}

// a name declared in the head region is visible to the body
#[test]
fn head_bindings_visible_in_body() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func() {
		s := 0
		for i := 0; i < 3; i++ {
			s += i
		}
		return s
	}()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 3);
}

#[test]
fn define_twice_in_same_frame_fails() {
    let mut m = Machine::new();
    let err = m
        .parse_and_eval("func() { a := 1; a := 2; return a }()")
        .expect_err("should fail");
    assert!(
        matches!(err.root(), RuntimeError::Reassignment { .. }),
        "{err}"
    );
}

// shadowing an outer name in an inner frame is allowed and scoped
#[test]
fn shadowing_is_scoped() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func() {
		a := 1
		if true {
			a := 2
			b := a
		}
		return a
	}()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 1);
}

#[test]
fn update_of_unknown_name_fails() {
    let mut m = Machine::new();
    let err = m
        .parse_and_eval("func() { b = 1; return b }()")
        .expect_err("should fail");
    assert!(
        matches!(err.root(), RuntimeError::UnknownName { .. }),
        "{err}"
    );
}

// var declarations behave like defines
#[test]
fn var_declarations() {
    let mut m = Machine::new();

    let res = m
        .parse_and_eval("func() { var a, b = 1, 2; return a + b }()")
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 3);

    let err = m
        .parse_and_eval("func() { var a = 1; var a = 2; return a }()")
        .expect_err("should fail");
    assert!(
        matches!(err.root(), RuntimeError::Reassignment { .. }),
        "{err}"
    );
}

// compound assignment updates through to the binding frame
#[test]
fn compound_assignment() {
    let mut m = Machine::new();
    for (stmt, expected) in [
        ("func() { a := 6; a += 2; return a }()", 8),
        ("func() { a := 6; a -= 2; return a }()", 4),
        ("func() { a := 6; a *= 2; return a }()", 12),
        ("func() { a := 6; a /= 2; return a }()", 3),
        ("func() { a := 6; a %= 4; return a }()", 2),
    ] {
        let res = m.parse_and_eval(stmt).expect(stmt);
        assert_eq!(i64::from_value(&res).unwrap(), expected, "{}", stmt);
    }
}
