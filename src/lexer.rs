//! Parses a single whitespace-free placement-language lexeme into a
//! tagged [`Operation`].

use crate::error::BrickError;
use crate::vector::Vec3;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// A single parsed placement-language token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    Push,
    Pop,
    Move(Vec3),
    Rotate(i64),
    SetColor(u32),
    Place(String),
    FillRect(Vec3),
    FillRectNoCheck(Vec3),
    PlaceBoundingBox(Vec3),
    PlaceBoundingSphere(i64),
    AssertFilled,
}

/// Process-wide lexer memoization table: `get_token` is a pure function
/// of its input, so results can be cached across calls and generations.
fn lexeme_cache() -> &'static Mutex<HashMap<String, Operation>> {
    static CACHE: OnceLock<Mutex<HashMap<String, Operation>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Parses one lexeme. Results are memoized process-wide since `get_token`
/// is a pure function of its input.
pub fn get_token(lexeme: &str) -> Result<Operation, BrickError> {
    if let Some(op) = lexeme_cache().lock().unwrap().get(lexeme) {
        return Ok(op.clone());
    }
    let op = parse_lexeme(lexeme)?;
    lexeme_cache().lock().unwrap().insert(lexeme.to_string(), op.clone());
    Ok(op)
}

fn parse_lexeme(lexeme: &str) -> Result<Operation, BrickError> {
    match lexeme {
        "(" => return Ok(Operation::Push),
        ")" => return Ok(Operation::Pop),
        _ => {}
    }

    let open = lexeme
        .find('(')
        .ok_or_else(|| BrickError::LexError(lexeme.to_string()))?;
    if !lexeme.ends_with(')') {
        return Err(BrickError::LexError(lexeme.to_string()));
    }
    let name = &lexeme[..open];
    let args = &lexeme[open + 1..lexeme.len() - 1];

    match name {
        "AssertFilled" if args.is_empty() => Ok(Operation::AssertFilled),
        "Place" if !args.is_empty() => Ok(Operation::Place(args.to_string())),
        "Rotate" => parse_int(args, lexeme).map(Operation::Rotate),
        "SetColor" => parse_int(args, lexeme).map(|n| Operation::SetColor(n as u32)),
        "PlaceBoundingSphere" => parse_int(args, lexeme).map(Operation::PlaceBoundingSphere),
        "Move" => parse_vec3(args, lexeme).map(Operation::Move),
        "FillRect" => parse_vec3(args, lexeme).map(Operation::FillRect),
        "FillRectNoCheck" => parse_vec3(args, lexeme).map(Operation::FillRectNoCheck),
        "PlaceBoundingBox" => parse_vec3(args, lexeme).map(Operation::PlaceBoundingBox),
        _ => Err(BrickError::UnknownOp(name.to_string())),
    }
}

fn parse_int(args: &str, lexeme: &str) -> Result<i64, BrickError> {
    args.trim()
        .parse::<i64>()
        .map_err(|_| BrickError::LexError(lexeme.to_string()))
}

fn parse_vec3(args: &str, lexeme: &str) -> Result<Vec3, BrickError> {
    let parts: Vec<&str> = args.split(',').collect();
    if parts.len() != 3 {
        return Err(BrickError::LexError(lexeme.to_string()));
    }
    let nums: Result<Vec<i64>, BrickError> = parts
        .iter()
        .map(|p| p.trim().parse::<i64>().map_err(|_| BrickError::LexError(lexeme.to_string())))
        .collect();
    let nums = nums?;
    Ok(Vec3::new(nums[0], nums[1], nums[2]))
}

/// Lexes a whitespace-separated sequence of lexemes.
pub fn lex(text: &str) -> Result<Vec<Operation>, BrickError> {
    text.split_whitespace().map(get_token).collect()
}
