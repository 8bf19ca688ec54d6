use crate::runtime::bridge::HostType;
use crate::runtime::error::RuntimeError;
use crate::runtime::machine::Machine;

#[test]
fn loops_basic() {
    let mut m = Machine::new();

    let res = m
        .parse_and_eval(
            r#"
	func (A float64, B float64) {
		for i := 0; i < B; i++ {
			A += i
		}
		return A
	} ( 1 , 10)
	"#,
        )
        .expect("eval");
    assert_eq!(f64::from_value(&res).unwrap(), 46.0);

    let res = m
        .parse_and_eval(
            r#"
	func(a, b) {
		for i := 0; i < a; i++ {
			b += i
		}
		return b
	}( 10, 1 )
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 46);
}

// the post clause is optional
#[test]
fn loops_without_post() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func(a, b) {
		for i := 0; i < a; {
			b = i
			i++
		}
		return b
	}( 10, 1 )
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 9);
}

#[test]
fn loops_continue() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func (A, B int) {
		for i := 0; i < B; i++ {
			if i > 4 {
				if i % 2 == 0 {
					continue
				}
			}
			A += i
		}
		return A
	} ( 1 , 10)
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 32);
}

#[test]
fn loops_break() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func() {
		b := 0
		for i := 0; i < 10; i++ {
			if i > 4 {
				break
			}
			b += i
		}
		return b
	}()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 10);
}

// a condition-less loop runs until something breaks it
#[test]
fn loops_bare_for() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func() {
		i := 0
		for {
			i++
			if i == 3 {
				break
			}
		}
		return i
	}()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 3);
}

#[test]
fn loops_range_array() {
    let mut m = Machine::new();

    let res = m
        .parse_and_eval(
            r#"
	func () {
		a := 0
		vals := []int{2,4,6,8,10}
		for i := range vals {
			a += i
		}
		return a
	} ()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 10);

    let res = m
        .parse_and_eval(
            r#"
	func () {
		a := 0
		vals := []int{2,4,6,8,10}
		for i, b := range vals {
			a += i + b
		}
		return a
	} ()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 40);
}

#[test]
fn range_break_and_return() {
    let mut m = Machine::new();

    let res = m
        .parse_and_eval(
            r#"
	func () {
		vals := []int{1, 2, 3}
		for i, v := range vals {
			if v == 2 {
				return i
			}
		}
		return -1
	} ()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 1);

    let res = m
        .parse_and_eval(
            r#"
	func () {
		a := 0
		for _, v := range []int{1, 2, 3} {
			if v == 3 {
				break
			}
			a += v
		}
		return a
	} ()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 3);
}

#[test]
fn range_requires_an_array() {
    let mut m = Machine::new();
    let err = m
        .parse_and_eval("func() { for i := range 5 { return i }; return 0 }()")
        .expect_err("should fail");
    assert!(
        matches!(err.root(), RuntimeError::UnsupportedType { .. }),
        "{err}"
    );
}

#[test]
fn for_condition_must_be_boolean() {
    let mut m = Machine::new();
    let err = m
        .parse_and_eval("func() { for i := 0; i; i++ { return i }; return 0 }()")
        .expect_err("should fail");
    assert!(
        matches!(err.root(), RuntimeError::BadCondition { .. }),
        "{err}"
    );
}

// a return inside a nested for/if exits the whole function
#[test]
fn return_escapes_nested_control_flow() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func(a) {
		b := 0
		for i:= 0; i < a; i++ {
			b = i
			if b > 5 {
				return b
			}
		}

		return 1000
	}(10)
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 6);
}
