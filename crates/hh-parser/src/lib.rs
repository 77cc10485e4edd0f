mod arith;
mod source;
mod split;
mod statement;

pub use arith::{parse_arith, ArithExpr, BinaryOp, MAX_ARITH_DEPTH};
pub use source::{is_loop_header, scan_lines, IndentUnit, SourceLine, LOOP_HEADER};
pub use split::{quoted_literal, split_top_level, top_level_segments, Segment};
pub use statement::{
    classify_line, is_identifier, parse_assignments, Assignment, Statement, COMMAND_KEYWORDS,
    GAME_MODULE,
};
