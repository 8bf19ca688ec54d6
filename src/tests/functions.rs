use crate::runtime::bridge::HostType;
use crate::runtime::error::RuntimeError;
use crate::runtime::machine::{Machine, MachineOptions};
use crate::runtime::value::Value;

#[test]
fn functions_simple() {
    let mut m = Machine::new();
    let res = m.parse_and_eval("func() { return 1 }()").expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 1);
}

// a returned function literal can be called again through the machine
#[test]
fn return_function_lit() {
    let mut m = Machine::new();
    let fun = m.parse_and_eval("func(a) { return a }").expect("eval");
    assert!(matches!(fun, Value::Func(_)));

    let res = m
        .call_function(&fun, &[1i64.into_value()])
        .expect("call");
    assert_eq!(i64::from_value(&res).unwrap(), 1);
}

#[test]
fn function_def_and_call() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func() {
		b := func(c) {
			return c
		}

		return b(100)
	}()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 100);
}

#[test]
fn function_args() {
    let mut m = Machine::new();

    // declare without type
    let res = m
        .parse_and_eval("func(a, b) {\n\t\treturn b\n\t}(1, 2)")
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 2);

    // declare with one type
    let res = m
        .parse_and_eval("func(a, b float64) {\n\t\treturn b\n\t}(1, 2)")
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 2);

    // declare with two types
    let res = m
        .parse_and_eval("func(a float64, b float64) {\n\t\treturn a\n\t}(1, 2)")
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 1);

    // extra arguments are ignored
    let res = m
        .parse_and_eval("func(a float64, b float64) {\n\t\treturn a\n\t}(1, 2, 3, 4, 5)")
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 1);
}

#[test]
fn too_few_arguments_fail() {
    let mut m = Machine::new();
    let err = m
        .parse_and_eval("func(a, b) { return a }(1)")
        .expect_err("should fail");
    assert!(
        matches!(
            err.root(),
            RuntimeError::TooFewArgs {
                expected: 2,
                received: 1
            }
        ),
        "{err}"
    );
}

// a function literal captures a live reference to its lexical environment
#[test]
fn function_closure() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func() {
		b := 10
		fun := func(c) {
			b = b + c
		}

		fun(10)

		return b
	}()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 20);
}

// closures share the frame they captured, so they observe later writes
#[test]
fn closure_sees_final_loop_value() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func() {
		b := 0
		f := func() { return b }
		for i := 0; i < 3; i++ {
			b = i
		}
		return f()
	}()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 2);
}

#[test]
fn function_multi_return() {
    let mut m = Machine::new();
    let res = m
        .parse_and_eval(
            r#"
	func(a) {
		b := 0
		for i:= 0; i < a; i++ {
			b += i
		}

		return b, 1000
	}(10)
	"#,
        )
        .expect("eval");
    assert!(matches!(res, Value::Pack(_)));
    let vals = Vec::<i64>::from_value(&res).expect("pack to host sequence");
    assert_eq!(vals, vec![45, 1000]);
}

#[test]
fn multi_return_packs_into_multi_assign() {
    let mut m = Machine::new();

    let res = m
        .parse_and_eval("func() { a, b := 1, 2; return a, b }()")
        .expect("eval");
    let vals = Vec::<i64>::from_value(&res).expect("pack");
    assert_eq!(vals, vec![1, 2]);

    let res = m
        .parse_and_eval(
            r#"
	func() {
		f := func() { return 1, 2 }
		a, b := f()
		return a + b
	}()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 3);
}

#[test]
fn multi_assign_arity_mismatch_fails() {
    let mut m = Machine::new();
    let err = m
        .parse_and_eval("func() { a, b := 1, 2, 3; return a }()")
        .expect_err("should fail");
    assert!(
        matches!(err.root(), RuntimeError::ArityMismatch { .. }),
        "{err}"
    );
}

#[test]
fn recursion_basic() {
    // limit stack size if it is going to overflow
    let mut m = Machine::with_options(MachineOptions {
        max_depth: 100,
        ..MachineOptions::default()
    });

    let res = m
        .parse_and_eval(
            r#"
	func() {
		Fib := func (n) {
			if n < 2 {
				return n
			}
			return Fib(n-1)
		}
		return Fib(2)
	}()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 1);

    let res = m
        .parse_and_eval(
            r#"
	func() {
		Fib := func (n) {
			if n < 2 {
				return n
			}
			return Fib(n-1) + Fib(n-2)
		}
		return Fib(6)
	}()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 8);
}

#[test]
fn recursion_deep() {
    let mut m = Machine::with_options(MachineOptions {
        max_depth: 10_000,
        ..MachineOptions::default()
    });
    let res = m
        .parse_and_eval(
            r#"
	func() {
		Fib := func (n) {
			if n < 2 {
				return n
			}
			return Fib(n-1) + Fib(n-2)
		}
		return Fib(30)
	}()
	"#,
        )
        .expect("eval");
    assert_eq!(i64::from_value(&res).unwrap(), 832040);
}

#[test]
fn unbounded_recursion_hits_depth_limit() {
    let mut m = Machine::with_options(MachineOptions {
        max_depth: 50,
        ..MachineOptions::default()
    });
    let err = m
        .parse_and_eval("func() { F := func() { return F() }; return F() }()")
        .expect_err("should fail");
    assert!(
        matches!(err.root(), RuntimeError::DepthExceeded),
        "{err}"
    );
}

#[test]
fn break_outside_loop_fails() {
    let mut m = Machine::new();
    let err = m
        .parse_and_eval("func() { break }()")
        .expect_err("should fail");
    assert!(matches!(err.root(), RuntimeError::StrayBranch), "{err}");
}

#[test]
fn bare_return_yields_empty_value() {
    let mut m = Machine::new();
    let res = m.parse_and_eval("func() { return }()").expect("eval");
    assert!(matches!(res, Value::Empty));
}

#[test]
fn calling_a_non_function_fails() {
    let mut m = Machine::new();
    let err = m
        .parse_and_eval("func() { a := 1; return a() }()")
        .expect_err("should fail");
    assert!(
        matches!(err.root(), RuntimeError::TypeMismatch { .. }),
        "{err}"
    );
}
