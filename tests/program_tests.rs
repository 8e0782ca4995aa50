// tests/program_tests.rs
//! Whole programs from `test_scripts/`.


use quill::{BlockId, CompiledModule, Instruction};
use test_harness::{TestHarness, listing};

const SCRIPTS: &[&str] = &[
    "fib.ql",
    "tree.ql",
    "arrays.ql",
    "control_flow.ql",
    "linked_list.ql",
];

fn names(module: &CompiledModule) -> Vec<&str> {
    module.functions().map(|f| f.name.as_str()).collect()
}

#[test]
fn every_script_compiles_to_a_valid_cfg() {
    let harness = TestHarness::new();
    for script in SCRIPTS {
        let module = harness.load_and_compile(script);
        for function in module.functions() {
            if let Err(violation) = function.verify() {
                panic!("{script}: {}: {violation}", function.name);
            }
            assert!(function.block(BlockId::ENTRY).is_some());
            assert!(function.block(BlockId::EXIT).is_some());
        }
    }
}

#[test]
fn fib() {
    let module = TestHarness::new().load_and_compile("fib.ql");
    assert_eq!(names(&module), vec!["fib", "fib_iter"]);

    assert_eq!(
        module.function("fib").unwrap().render(),
        listing(
            "
            L0:
                %t0 = n<2
                if %t0 goto L2 else goto L3
            L2:
                %ret = n
                goto  L1
            L1:
            L3:
                %t0 = fib
                %t1 = n-1
                call %t0 params %t1
                %t1 = fib
                %t2 = n-2
                call %t1 params %t2
                %t0 = %t0+%t1
                %ret = %t0
                goto  L1
            "
        )
    );
}

#[test]
fn fib_iter_registers() {
    let module = TestHarness::new().load_and_compile("fib.ql");
    let model = module.model();
    let code = module.function("fib_iter").unwrap();

    // n, a, b in the function scopes, t in the loop body.
    assert_eq!(code.local_count(), 4);
    let register_of = |name: &str| {
        let (id, _) = model
            .symbols
            .iter()
            .find(|(_, s)| s.as_var().is_some() && s.name() == name)
            .unwrap();
        code.register(id).unwrap()
    };
    assert_eq!(register_of("n"), 0);
    assert!(register_of("a") < register_of("b"));
    assert_eq!(register_of("t"), 3);
}

#[test]
fn tree() {
    let module = TestHarness::new().load_and_compile("tree.ql");
    assert_eq!(
        module.model().describe_global("Tree").unwrap(),
        "struct Tree{value: Int;left: Tree?;right: Tree?;}"
    );
    assert_eq!(
        module.function("left_value").unwrap().render(),
        listing(
            "
            L0:
                %t0 = t.left
                %ret = %t0.value
                goto  L1
            L1:
            "
        )
    );
    assert_eq!(
        module.function("grow_left").unwrap().render(),
        listing(
            "
            L0:
                %t1 = leaf
                %t2 = v
                call %t1 params %t2
                t.left = %t1
                goto  L1
            L1:
            "
        )
    );
}

#[test]
fn arrays() {
    let module = TestHarness::new().load_and_compile("arrays.ql");
    let sum = module.function("sum").unwrap();
    let head = sum
        .blocks()
        .iter()
        .find(|b| b.is_loop_head())
        .expect("sum has a loop");
    assert_eq!(head.predecessors.len(), 2);
    assert!(sum.render().contains("\t%t1 = a[i]\n"));
    assert!(sum.render().contains("\t%t0 = total+%t1\n"));

    let scale = module.function("scale").unwrap().render();
    assert!(scale.contains("\t%t1 = a[i]\n"));
    assert!(scale.contains("\ta[i] = %t1\n"));
}

#[test]
fn control_flow() {
    let module = TestHarness::new().load_and_compile("control_flow.ql");
    let pairs = module.function("count_pairs").unwrap();
    let loop_heads = pairs.blocks().iter().filter(|b| b.is_loop_head()).count();
    assert_eq!(loop_heads, 2);

    let classify = module.function("classify").unwrap();
    let returns = classify
        .blocks()
        .iter()
        .flat_map(|b| &b.instructions)
        .filter(|i| matches!(i, Instruction::Move { to: quill::Operand::Return, .. }))
        .count();
    assert_eq!(returns, 3);
    assert_eq!(
        classify.block(BlockId::EXIT).unwrap().predecessors.len(),
        3
    );

    let first = module.function("first_multiple").unwrap().render();
    assert!(first.contains("\t%ret = -1\n"));
}

#[test]
fn linked_list() {
    let module = TestHarness::new().load_and_compile("linked_list.ql");
    assert_eq!(
        module.model().describe_global("List").unwrap(),
        "struct List{head: Node?;size: Int;}"
    );
    let push = module.function("push").unwrap().render();
    assert!(push.contains("\t%t1 = New(Node)\n"));
    assert!(push.contains("\t%t1.value = v\n"));
    assert!(push.contains("\t%t3 = list.head\n"));
    assert!(push.contains("\t%t1.next = %t3\n"));
    assert!(push.contains("\tlist.head = %t1\n"));
}
