// tests/codegen_tests.rs
//! Listings produced by the register-machine code generator.


use quill::{BlockId, Instruction};
use test_harness::{listing, render};

#[test]
fn return_constant() {
    let src = "func foo(n: Int)->Int { return 1; }";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %ret = 1
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn return_negative_constant_is_folded() {
    let src = "func foo(n: Int)->Int { return -1; }";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %ret = -1
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn return_parameter() {
    let src = "func foo(n: Int)->Int { return n; }";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %ret = n
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn negate_parameter() {
    let src = "func foo(n: Int)->Int { return -n; }";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %t0 = -n
                %ret = %t0
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn add_parameter_and_constant() {
    let src = "func foo(n: Int)->Int { return n+1; }";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %t0 = n+1
                %ret = %t0
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn constant_addition_is_folded() {
    let src = "func foo(n: Int)->Int { return 1+1; }";
    let out = render(src);
    assert_eq!(
        out,
        listing(
            "
            L0:
                %ret = 2
                goto  L1
            L1:
            "
        )
    );
    assert!(!out.contains('+'));
}

#[test]
fn constant_chain_is_folded() {
    let src = "func foo(n: Int)->Int { return 1+1-1; }";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %ret = 1
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn constant_comparisons_are_folded() {
    let eq = "func foo(n: Int)->Int { return 2==2; }";
    let ne = "func foo(n: Int)->Int { return 1!=1; }";
    assert!(render(eq).contains("\t%ret = 1\n"));
    assert!(render(ne).contains("\t%ret = 0\n"));
}

#[test]
fn greater_equal_folds_as_greater_or_equal() {
    let src = "func foo()->Int { return 3>=2; }";
    assert!(render(src).contains("\t%ret = 1\n"));
    let src = "func foo()->Int { return 1>=2; }";
    assert!(render(src).contains("\t%ret = 0\n"));
}

#[test]
fn returned_index_stays_symbolic() {
    let src = "func foo(n: [Int])->Int { return n[0]; }";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %ret = n[0]
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn indexed_operands_are_loaded_into_temps() {
    let src = "func foo(n: [Int])->Int { return n[0]+n[1]; }";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %t0 = n[0]
                %t1 = n[1]
                %t0 = %t0+%t1
                %ret = %t0
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn new_array_with_constants() {
    let src = "func foo()->[Int] { return new [Int] { 1, 2, 3 }; }";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %t0 = New([Int,Int])
                %t0.append(1)
                %t0.append(2)
                %t0.append(3)
                %ret = %t0
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn new_array_with_parameter() {
    let src = "func foo(n: Int) -> [Int] { return new [Int] { n }; }";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %t0 = New([Int,Int])
                %t0.append(n)
                %ret = %t0
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn add_two_parameters() {
    let src = "func add(x: Int, y: Int) -> Int { return x+y; }";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %t0 = x+y
                %ret = %t0
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn field_store_is_direct() {
    let src = "
        struct Person
        {
            var age: Int
            var children: Int
        }
        func foo(p: Person) -> Person {
            p.age = 10;
        }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                p.age = 10
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn new_struct_with_field_initializers() {
    let src = "
        struct Person
        {
            var age: Int
            var children: Int
        }
        func foo() -> Person {
            return new Person { age=10, children=0 };
        }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %t0 = New(Person)
                %t0.age = 10
                %t0.children = 0
                %ret = %t0
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn index_stores_are_direct() {
    let src = "
        func foo(array: [Int]) {
            array[0] = 1
            array[1] = 2
        }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                array[0] = 1
                array[1] = 2
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn if_without_else_returning_from_both_paths() {
    let src = "
        func min(x: Int, y: Int) -> Int {
            if (x < y)
                return x;
            return y;
        }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %t0 = x<y
                if %t0 goto L2 else goto L3
            L2:
                %ret = x
                goto  L1
            L1:
            L3:
                %ret = y
                goto  L1
            "
        )
    );
}

#[test]
fn while_with_return_in_body() {
    let src = "
        func loop() {
            while (1)
                return;
            return;
        }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                goto  L2
            L2:
                if 1 goto L3 else goto L4
            L3:
                goto  L1
            L1:
            L4:
                goto  L1
            "
        )
    );
}

#[test]
fn while_with_break() {
    let src = "
        func loop() {
            while (1)
                break;
            return;
        }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                goto  L2
            L2:
                if 1 goto L3 else goto L4
            L3:
                goto  L4
            L4:
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn while_counting_down() {
    let src = "
        func loop(n: Int) {
            while (n > 0) {
                n = n - 1;
            }
            return;
        }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                goto  L2
            L2:
                %t0 = n>0
                if %t0 goto L3 else goto L4
            L3:
                %t0 = n-1
                n = %t0
                goto  L2
            L4:
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn continue_jumps_to_loop_head() {
    let src = "
        func loop(n: Int) {
            while (n > 0) {
                n = n - 1
                continue
            }
        }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                goto  L2
            L2:
                %t0 = n>0
                if %t0 goto L3 else goto L4
            L3:
                %t0 = n-1
                n = %t0
                goto  L2
            L4:
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn call_without_arguments() {
    let src = "
        func foo() {}
        func bar() { foo(); }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                goto  L1
            L1:
            L0:
                %t0 = foo
                call %t0
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn call_moves_arguments_into_temps() {
    let src = "
        func foo(x: Int, y: Int) {}
        func bar() { foo(1,2); }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                goto  L1
            L1:
            L0:
                %t0 = foo
                %t1 = 1
                %t2 = 2
                call %t0 params %t1, %t2
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn call_result_is_a_fresh_temp() {
    let src = "
        func foo(x: Int, y: Int)->Int { return x+y; }
        func bar()->Int { var t = foo(1,2); return t+1; }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %t0 = x+y
                %ret = %t0
                goto  L1
            L1:
            L0:
                %t0 = foo
                %t1 = 1
                %t2 = 2
                call %t0 params %t1, %t2
                t = %t0
                %t0 = t+1
                %ret = %t0
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn call_with_parameter_argument() {
    let src = "
        func foo(x: Int, y: Int)->Int { return x+y; }
        func bar(a: Int)->Int { var t = foo(a,2); return t+1; }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %t0 = x+y
                %ret = %t0
                goto  L1
            L1:
            L0:
                %t0 = foo
                %t1 = a
                %t2 = 2
                call %t0 params %t1, %t2
                t = %t0
                %t0 = t+1
                %ret = %t0
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn nested_call_argument_is_already_a_temp() {
    let src = "
        func id(x: Int)->Int { return x; }
        func bar()->Int { return id(id(1)); }
    ";
    let out = render(src);
    assert!(out.ends_with(&listing(
        "
        L0:
            %t0 = id
            %t1 = id
            %t2 = 1
            call %t1 params %t2
            call %t0 params %t1
            %ret = %t0
            goto  L1
        L1:
        "
    )));
}

#[test]
fn returned_field_stays_symbolic() {
    let src = "
        struct Person
        {
            var age: Int
            var children: Int
        }
        func foo(p: Person) -> Int {
            return p.age;
        }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %ret = p.age
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn chained_field_access_loads_inner_field() {
    let src = "
        struct Person
        {
            var age: Int
            var parent: Person
        }
        func foo(p: Person) -> Int {
            return p.parent.age;
        }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %t0 = p.parent
                %ret = %t0.age
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn index_then_field_chain() {
    let src = "
        struct Person
        {
            var age: Int
            var parent: Person
        }
        func foo(p: [Person], i: Int) -> Int {
            return p[i].parent.age;
        }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %t0 = p[i]
                %t0 = %t0.parent
                %ret = %t0.age
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn if_else_joins_both_arms() {
    let src = "
        func abs(x: Int) -> Int {
            var r = 0
            if (x < 0) r = -x else r = x
            return r
        }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                r = 0
                %t0 = x<0
                if %t0 goto L2 else goto L3
            L2:
                %t0 = -x
                r = %t0
                goto  L4
            L4:
                %ret = r
                goto  L1
            L1:
            L3:
                r = x
                goto  L4
            "
        )
    );
}

#[test]
fn code_after_return_is_dropped() {
    let src = "
        func foo() -> Int {
            return 1
            return 2
        }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %ret = 1
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn void_call_statement_leaves_nothing_behind() {
    let src = "
        func tick(n: Int) {}
        func run() {
            tick(1)
            tick(2)
        }
    ";
    let module = test_harness::compile_ok(src);
    let run = module.function("run").unwrap();
    assert_eq!(
        run.render(),
        listing(
            "
            L0:
                %t0 = tick
                %t1 = 1
                call %t0 params %t1
                %t0 = tick
                %t1 = 2
                call %t0 params %t1
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn folding_can_be_disabled() {
    let options = quill::CompilerOptions::new().with_constant_folding(false);
    let module = quill::compile_source_with("func foo() -> Int { return 1+2*3 }", options).unwrap();
    assert_eq!(
        module.render(),
        listing(
            "
            L0:
                %t1 = 2*3
                %t0 = 1+%t1
                %ret = %t0
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn if_without_else_has_four_blocks() {
    let src = "
        func f(n: Int) -> Int {
            var r = 0
            if (n) r = 1
            return r
        }
    ";
    let module = test_harness::compile_ok(src);
    let code = module.function("f").unwrap();
    assert_eq!(code.blocks().len(), 4);
    assert!(code.verify().is_ok());

    let entry = code.block(BlockId::ENTRY).unwrap();
    match entry.terminator() {
        Some(Instruction::Branch {
            if_true, if_false, ..
        }) => {
            let join = code.block(*if_false).unwrap();
            assert_eq!(join.predecessors.len(), 2);
            assert_eq!(code.block(*if_true).unwrap().successors, vec![*if_false]);
        }
        other => panic!("entry should end in a branch, got {other:?}"),
    }
}

#[test]
fn nested_block_locals_get_fresh_registers() {
    let src = "
        func f(a: Int) -> Int {
            var b = a
            {
                var c = b
                b = c
            }
            {
                var d = b
                b = d
            }
            return b
        }
    ";
    let module = test_harness::compile_ok(src);
    let model = module.model();
    let code = module.function("f").unwrap();
    let register_of = |name: &str| {
        let (id, _) = model
            .symbols
            .iter()
            .find(|(_, s)| s.as_var().is_some() && s.name() == name)
            .unwrap();
        code.register(id).unwrap()
    };
    assert_eq!(register_of("a"), 0);
    assert_eq!(register_of("b"), 1);
    assert_eq!(register_of("c"), 2);
    assert_eq!(register_of("d"), 2);
    assert_eq!(code.local_count(), 3);
}

#[test]
fn loop_head_is_flagged() {
    let src = "func f(n: Int) { while (n) n = n - 1 }";
    let module = test_harness::compile_ok(src);
    let code = module.function("f").unwrap();
    let heads: Vec<_> = code.blocks().iter().filter(|b| b.is_loop_head()).collect();
    assert_eq!(heads.len(), 1);
    assert_eq!(heads[0].id, BlockId(2));
    assert!(heads[0].predecessors.contains(&BlockId::ENTRY));
    assert!(heads[0].predecessors.contains(&BlockId(3)));
}

#[test]
fn computed_store_index_survives_computed_value() {
    let src = "func f(a: [Int], i: Int, j: Int) { a[i+1] = a[j+1] }";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %t1 = i+1
                %t2 = j+1
                %t2 = a[%t2]
                a[%t1] = %t2
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn computed_store_index_survives_call() {
    let src = "
        func g() -> Int { return 7 }
        func f(a: [Int], i: Int) { a[i+1] = g() }
    ";
    let module = test_harness::compile_ok(src);
    assert_eq!(
        module.function("f").unwrap().render(),
        listing(
            "
            L0:
                %t1 = i+1
                %t2 = g
                call %t2
                a[%t1] = %t2
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn indexed_field_loads_the_array_first() {
    let src = "
        struct Foo { var bar: [Int] }
        func get(foo: Foo) -> Int { return foo.bar[0] }
    ";
    assert_eq!(
        render(src),
        listing(
            "
            L0:
                %t0 = foo.bar
                %ret = %t0[0]
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn struct_initializers_use_declared_field_positions() {
    let src = "
        struct P { var x: Int var y: Int }
        func make() -> P { return new P { y = 2, x = 1 } }
    ";
    let module = test_harness::compile_ok(src);
    let code = module.function("make").unwrap();
    let stores: Vec<_> = code
        .block(BlockId::ENTRY)
        .unwrap()
        .instructions
        .iter()
        .filter_map(|i| match i {
            Instruction::Move {
                to: quill::Operand::LoadField { field, index, .. },
                ..
            } => Some((field.as_str(), *index)),
            _ => None,
        })
        .collect();
    assert_eq!(stores, vec![("y", 1), ("x", 0)]);
    assert!(code.render().contains("\t%t0.y = 2\n\t%t0.x = 1\n"));
}
