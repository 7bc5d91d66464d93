// TDB - Trace Debugger
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Sample traces recorded from small shader-style programs.
//!
//! Each trace carries its source text. They back the `tdb demo` command and the
//! player's behavioral tests.

use crate::types::{DebugTrace, DebugTraceBuilder, NumberKind};

/// Names accepted by [`by_name`]
pub const SAMPLE_NAMES: &[&str] =
    &["hello-world", "functions", "variables", "if-statement", "for-loop", "step-out"];

/// Look up a sample trace by name
pub fn by_name(name: &str) -> Option<DebugTrace> {
    match name {
        "hello-world" => Some(hello_world()),
        "functions" => Some(functions()),
        "variables" => Some(variables()),
        "if-statement" => Some(if_statement()),
        "for-loop" => Some(for_loop()),
        "step-out" => Some(step_out()),
        _ => None,
    }
}

/// `int main() { return 2 + 2; }`
pub fn hello_world() -> DebugTrace {
    let mut b = DebugTraceBuilder::new();
    b.source(
        r"                   // Line 1
int main() {       // Line 2
    return 2 + 2;  // Line 3
}                  // Line 4",
    );
    let main = b.function("int main()", 1);
    let result = b.result_slot(main, NumberKind::Signed);

    b.enter(main, 2).scope_enter().line(3).write(result, 4).exit(main, Some(result));
    b.build()
}

/// `main` calls `fnA` which calls `fnB`; every call returns 4
pub fn functions() -> DebugTrace {
    let mut b = DebugTraceBuilder::new();
    b.source(
        r"                             // Line 1
int fnB() {                     // Line 2
    return 2 + 2;               // Line 3
}                               // Line 4
int fnA() {                     // Line 5
    return fnB();               // Line 6
}                               // Line 7
int main() {                    // Line 8
    return fnA();               // Line 9
}                               // Line 10",
    );
    let main = b.function("int main()", 1);
    let fn_a = b.function("int fnA()", 1);
    let fn_b = b.function("int fnB()", 1);
    let main_result = b.result_slot(main, NumberKind::Signed);
    let a_result = b.result_slot(fn_a, NumberKind::Signed);
    let b_result = b.result_slot(fn_b, NumberKind::Signed);

    b.enter(main, 8).scope_enter().line(9);
    b.enter(fn_a, 5).scope_enter().line(6);
    b.enter(fn_b, 2).scope_enter().line(3);
    b.write(b_result, 4).exit(fn_b, Some(b_result));
    b.write(a_result, 4).exit(fn_a, Some(a_result));
    b.write(main_result, 4).exit(main, Some(main_result));
    b.build()
}

/// Scalars, a bool, a `float4`, a `float3x3` and a call whose result is discarded
pub fn variables() -> DebugTrace {
    let mut b = DebugTraceBuilder::new();
    b.source(
        r"                                   // Line 1
float func() {                        // Line 2
    float z = 456;                    // Line 3
    return z;                         // Line 4
}                                     // Line 5
int main() {                          // Line 6
    int a = 123;                      // Line 7
    bool b = true;                    // Line 8
    func();                           // Line 9
    float4 c = float4(0, 0.5, 1, -1); // Line 10
    float3x3 d = float3x3(2);         // Line 11
    return a;                         // Line 12
}                                     // Line 13",
    );
    let main = b.function("int main()", 1);
    let func = b.function("float func()", 1);
    let main_result = b.result_slot(main, NumberKind::Signed);
    let a = b.scalar_slot("a", NumberKind::Signed, 7);
    let flag = b.scalar_slot("b", NumberKind::Boolean, 8);
    let func_result = b.result_slot(func, NumberKind::Float);
    let z = b.scalar_slot("z", NumberKind::Float, 3);
    let c = b.vector_slots("c", NumberKind::Float, 4, 10);
    let d = b.matrix_slots("d", NumberKind::Float, 3, 3, 11);

    b.enter(main, 6).scope_enter();
    b.line(7).write(a, 123);
    b.line(8).write_bool(flag, true);
    b.line(9);
    b.enter(func, 2).scope_enter();
    b.line(3).write_f32(z, 456.0);
    b.line(4).write_f32(func_result, 456.0).exit(func, Some(func_result));
    b.line(10);
    for (slot, value) in c.iter().zip([0.0, 0.5, 1.0, -1.0]) {
        b.write_f32(*slot, value);
    }
    b.line(11);
    for (index, slot) in d.iter().enumerate() {
        let on_diagonal = index / 3 == index % 3;
        b.write_f32(*slot, if on_diagonal { 2.0 } else { 0.0 });
    }
    b.line(12).write(main_result, 123).exit(main, Some(main_result));
    b.build()
}

/// Two `if` statements; only the taken branches appear in the trace
pub fn if_statement() -> DebugTrace {
    let mut b = DebugTraceBuilder::new();
    b.source(
        r"                  // Line 1
int main() {      // Line 2
    int val;      // Line 3
    if (true) {   // Line 4
        val = 1;  // Line 5
    } else {      // Line 6
        val = 2;  // Line 7
    }             // Line 8
    if (false) {  // Line 9
        val = 3;  // Line 10
    } else {      // Line 11
        val = 4;  // Line 12
    }             // Line 13
    return val;   // Line 14
}                 // Line 15",
    );
    let main = b.function("int main()", 1);
    let result = b.result_slot(main, NumberKind::Signed);
    let val = b.scalar_slot("val", NumberKind::Signed, 3);

    b.enter(main, 2).scope_enter();
    b.line(3).write(val, 0);
    b.line(4).scope_enter().line(5).write(val, 1).scope_exit();
    b.line(9).scope_enter().line(12).write(val, 4).scope_exit();
    b.line(14).write(result, 4).scope_exit().exit(main, Some(result));
    b.build()
}

/// A two-iteration `for` loop.
///
/// The final `++x` runs with the loop mask off, so it records no write.
pub fn for_loop() -> DebugTrace {
    let mut b = DebugTraceBuilder::new();
    b.source(
        r"                                   // Line 1
int main() {                       // Line 2
    int val = 0;                   // Line 3
    for (int x = 1; x < 3; ++x) {  // Line 4
        val = x;                   // Line 5
    }                              // Line 6
    return val;                    // Line 7
}                                  // Line 8",
    );
    let main = b.function("int main()", 1);
    let result = b.result_slot(main, NumberKind::Signed);
    let val = b.scalar_slot("val", NumberKind::Signed, 3);
    let x = b.scalar_slot("x", NumberKind::Signed, 4);

    b.enter(main, 2).scope_enter();
    b.line(3).write(val, 0);
    b.line(4);
    for i in 1..3 {
        b.write(x, i).scope_enter();
        b.line(5).write(val, i).scope_exit();
        b.line(4);
    }
    b.line(7).write(result, 2).exit(main, Some(result));
    b.build()
}

/// `main` calls `fn`, which assigns four locals before returning
pub fn step_out() -> DebugTrace {
    let mut b = DebugTraceBuilder::new();
    b.source(
        r"                  // Line 1
int fn() {        // Line 2
    int a = 11;   // Line 3
    int b = 22;   // Line 4
    int c = 33;   // Line 5
    int d = 44;   // Line 6
    return d;     // Line 7
}                 // Line 8
int main() {      // Line 9
    return fn();  // Line 10
}                 // Line 11",
    );
    let main = b.function("int main()", 1);
    let func = b.function("int fn()", 1);
    let main_result = b.result_slot(main, NumberKind::Signed);
    let fn_result = b.result_slot(func, NumberKind::Signed);
    let locals: Vec<_> = ["a", "b", "c", "d"]
        .iter()
        .zip(3..)
        .map(|(name, line)| b.scalar_slot(name, NumberKind::Signed, line))
        .collect();

    b.enter(main, 9).scope_enter().line(10);
    b.enter(func, 2).scope_enter();
    for (slot, (line, value)) in locals.iter().zip((3..).zip([11, 22, 33, 44])) {
        b.line(line).write(*slot, value);
    }
    b.line(7).write(fn_result, 44).exit(func, Some(fn_result));
    b.write(main_result, 44).exit(main, Some(main_result));
    b.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_samples_are_well_formed() {
        for name in SAMPLE_NAMES {
            let trace = by_name(name).unwrap();
            assert_eq!(trace.validate(), Ok(()), "sample {name}");
            assert!(!trace.source().is_empty(), "sample {name}");
        }
        assert!(by_name("missing").is_none());
    }

    #[test]
    fn test_source_lines_line_up() {
        let trace = hello_world();
        assert!(trace.source_line(3).unwrap().contains("return 2 + 2;"));
        assert!(trace.source_line(3).unwrap().ends_with("// Line 3"));
    }
}
