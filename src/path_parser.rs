//! Parsers for SVG path data and for the `points` attribute of polylines and polygons.

use std::fmt;

use crate::path_builder::*;

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Token {
    Number(f64),
    Flag(bool),
    Command(u8),
    Comma,
}

use Token::{Comma, Command, Flag, Number};

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum LexError {
    ParseFloatError,
    UnexpectedByte(u8),
    UnexpectedEof,
}

/// Splits path data into tokens.
#[derive(Debug)]
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    flags_required: u8,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input: input.as_bytes(),
            pos: 0,
            flags_required: 0,
        }
    }

    /// Makes the next two digits be read as arc flags instead of numbers.
    ///
    /// Flags can only be told apart from numbers by their position in an arc's
    /// arguments, and they need no separator: `a1 1 0 01 2 3` is valid.
    pub fn require_flags(&mut self) {
        self.flags_required = 2;
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance_over_optional(&mut self, needle: u8) -> bool {
        if self.peek() == Some(needle) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn advance_over_digits(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn match_number(&mut self) -> Result<Token, LexError> {
        let start = self.pos;

        let _ = self.advance_over_optional(b'-') || self.advance_over_optional(b'+');
        let int_digits = self.advance_over_digits();
        let frac_digits = self.advance_over_optional(b'.') && self.advance_over_digits();

        if !int_digits && !frac_digits {
            return Err(match self.peek() {
                None => LexError::UnexpectedEof,
                Some(c) => LexError::UnexpectedByte(c),
            });
        }

        // An exponent, unless the 'e' starts a unit like "em" or "ex".
        if matches!(self.peek(), Some(b'e') | Some(b'E'))
            && !matches!(self.input.get(self.pos + 1), Some(b'm') | Some(b'x'))
        {
            let mark = self.pos;
            self.pos += 1;
            let _ = self.advance_over_optional(b'-') || self.advance_over_optional(b'+');
            if !self.advance_over_digits() {
                self.pos = mark;
            }
        }

        std::str::from_utf8(&self.input[start..self.pos])
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .map(Number)
            .ok_or(LexError::ParseFloatError)
    }
}

impl Iterator for Lexer<'_> {
    type Item = (usize, Result<Token, LexError>);

    fn next(&mut self) -> Option<Self::Item> {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
            self.pos += 1;
        }

        let pos = self.pos;
        let c = self.peek()?;

        let token = match c {
            b',' => {
                self.pos += 1;
                Ok(Comma)
            }

            c if c.is_ascii_alphabetic() => {
                self.pos += 1;
                Ok(Command(c))
            }

            b'0' | b'1' if self.flags_required > 0 => {
                self.flags_required -= 1;
                self.pos += 1;
                Ok(Flag(c == b'1'))
            }

            c if self.flags_required > 0 && c.is_ascii_digit() => {
                self.pos += 1;
                Err(LexError::UnexpectedByte(c))
            }

            c if c.is_ascii_digit() || c == b'-' || c == b'+' || c == b'.' => self.match_number(),

            c => {
                self.pos += 1;
                Err(LexError::UnexpectedByte(c))
            }
        };

        Some((pos, token))
    }
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    UnexpectedToken(Token),
    UnexpectedCommand(u8),
    UnexpectedEof,
    LexError(LexError),
}

#[derive(Debug, PartialEq)]
pub struct ParseError {
    pub position: usize,
    pub kind: ErrorKind,
}

impl ParseError {
    fn new(position: usize, kind: ErrorKind) -> ParseError {
        ParseError { position, kind }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self.kind {
            ErrorKind::UnexpectedToken(_) => "unexpected token",
            ErrorKind::UnexpectedCommand(_) => "unexpected command",
            ErrorKind::UnexpectedEof => "unexpected end of data",
            ErrorKind::LexError(_) => "error processing token",
        };
        write!(f, "error at position {}: {}", self.position, description)
    }
}

/// Recursive descent parser for path data, following the grammar in
/// <https://www.w3.org/TR/SVG/paths.html#PathDataBNF>.
///
/// Commas are optional between and inside coordinate pairs, and so is whitespace
/// where the tokens can be told apart: `M-10,20-30-40` is `M -10 20 -30 -40`, and
/// `M.1-2,3E2-4` is `M 0.1 -2 300 -4`.
///
/// Relative coordinates are made absolute here; the builder only sees absolute ones.
struct PathParser<'b> {
    tokens: Lexer<'b>,
    lookahead: Option<(usize, Result<Token, LexError>)>,

    builder: &'b mut PathBuilder,

    current_x: f64,
    current_y: f64,

    // Control point of the previous cubic curve, for `S`.
    cubic_reflection_x: f64,
    cubic_reflection_y: f64,

    // Control point of the previous quadratic curve, for `T`.
    quadratic_reflection_x: f64,
    quadratic_reflection_y: f64,

    subpath_start_x: f64,
    subpath_start_y: f64,
}

impl<'b> PathParser<'b> {
    fn new(builder: &'b mut PathBuilder, path_str: &'b str) -> PathParser<'b> {
        let mut tokens = Lexer::new(path_str);
        let lookahead = tokens.next();

        PathParser {
            tokens,
            lookahead,
            builder,
            current_x: 0.0,
            current_y: 0.0,
            cubic_reflection_x: 0.0,
            cubic_reflection_y: 0.0,
            quadratic_reflection_x: 0.0,
            quadratic_reflection_y: 0.0,
            subpath_start_x: 0.0,
            subpath_start_y: 0.0,
        }
    }

    fn advance(&mut self) {
        self.lookahead = self.tokens.next();
    }

    fn unexpected(&self) -> ParseError {
        match self.lookahead {
            Some((pos, Ok(t))) => ParseError::new(pos, ErrorKind::UnexpectedToken(t)),
            Some((pos, Err(e))) => ParseError::new(pos, ErrorKind::LexError(e)),
            None => ParseError::new(self.tokens.input.len(), ErrorKind::UnexpectedEof),
        }
    }

    // The match_* methods either consume the requested token and return its value,
    // or return an error without advancing.

    fn match_command(&mut self) -> Result<u8, ParseError> {
        match self.lookahead {
            Some((_, Ok(Command(c)))) => {
                self.advance();
                Ok(c)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn match_number(&mut self) -> Result<f64, ParseError> {
        match self.lookahead {
            Some((_, Ok(Number(n)))) => {
                self.advance();
                Ok(n)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn match_flag(&mut self) -> Result<bool, ParseError> {
        match self.lookahead {
            Some((_, Ok(Flag(f)))) => {
                self.advance();
                Ok(f)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn match_comma(&mut self) -> bool {
        if let Some((_, Ok(Comma))) = self.lookahead {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_comma_number(&mut self) -> Result<f64, ParseError> {
        self.match_comma();
        self.match_number()
    }

    /// Reads the x-axis rotation of an arc, and then its two flags.
    fn match_number_and_flags(&mut self) -> Result<(f64, bool, bool), ParseError> {
        // The lexer has to switch to flags before it reads past the number.
        let n = match self.lookahead {
            Some((_, Ok(Number(n)))) => n,
            _ => return Err(self.unexpected()),
        };

        self.tokens.require_flags();
        self.advance();

        self.match_comma();
        let f1 = self.match_flag()?;

        self.match_comma();
        let f2 = self.match_flag()?;

        Ok((n, f1, f2))
    }

    fn peek_number(&self) -> bool {
        matches!(self.lookahead, Some((_, Ok(Number(_)))))
    }

    fn coordinate_pair(&mut self) -> Result<(f64, f64), ParseError> {
        Ok((self.match_number()?, self.match_comma_number()?))
    }

    /// Whether an argument sequence ends: it continues after a comma or before a number.
    fn should_break_arg_sequence(&mut self) -> bool {
        !self.match_comma() && !self.peek_number()
    }

    fn parse(&mut self) -> Result<(), ParseError> {
        while self.lookahead.is_some() {
            self.moveto()?;
            while self.drawto_command()? {}
        }

        Ok(())
    }

    fn set_current_point(&mut self, x: f64, y: f64) {
        self.current_x = x;
        self.current_y = y;

        self.cubic_reflection_x = x;
        self.cubic_reflection_y = y;

        self.quadratic_reflection_x = x;
        self.quadratic_reflection_y = y;
    }

    fn emit_move_to(&mut self, x: f64, y: f64) {
        self.set_current_point(x, y);
        self.subpath_start_x = x;
        self.subpath_start_y = y;

        self.builder.move_to(x, y);
    }

    fn emit_line_to(&mut self, x: f64, y: f64) {
        self.set_current_point(x, y);
        self.builder.line_to(x, y);
    }

    fn emit_curve_to(&mut self, x2: f64, y2: f64, x3: f64, y3: f64, x4: f64, y4: f64) {
        self.builder.curve_to(x2, y2, x3, y3, x4, y4);

        self.set_current_point(x4, y4);
        self.cubic_reflection_x = x3;
        self.cubic_reflection_y = y3;
    }

    fn emit_quadratic_curve_to(&mut self, a: f64, b: f64, c: f64, d: f64) {
        self.builder.quad_to(a, b, c, d);

        self.set_current_point(c, d);
        self.quadratic_reflection_x = a;
        self.quadratic_reflection_y = b;
    }

    fn emit_close_path(&mut self) {
        let (x, y) = (self.subpath_start_x, self.subpath_start_y);
        self.set_current_point(x, y);

        self.builder.close_path();
    }

    fn moveto(&mut self) -> Result<(), ParseError> {
        let absolute = match self.match_command()? {
            b'M' => true,
            b'm' => false,
            c => {
                // match_command already consumed it; report its position.
                let pos = self.tokens.pos.saturating_sub(1);
                return Err(ParseError::new(pos, ErrorKind::UnexpectedCommand(c)));
            }
        };

        let (mut x, mut y) = self.coordinate_pair()?;

        if !absolute {
            x += self.current_x;
            y += self.current_y;
        }

        self.emit_move_to(x, y);

        // Extra coordinate pairs after a moveto are implicit linetos.
        if self.match_comma() || self.peek_number() {
            self.lineto_argument_sequence(absolute)
        } else {
            Ok(())
        }
    }

    fn drawto_command(&mut self) -> Result<bool, ParseError> {
        let (cmd, absolute) = match self.lookahead {
            Some((_, Ok(Command(c)))) if c != b'M' && c != b'm' => {
                (c.to_ascii_uppercase(), c.is_ascii_uppercase())
            }
            _ => return Ok(false),
        };

        match cmd {
            b'Z' => {
                self.advance();
                self.emit_close_path();
            }
            b'L' => {
                self.advance();
                self.lineto_argument_sequence(absolute)?;
            }
            b'H' => {
                self.advance();
                self.horizontal_lineto_argument_sequence(absolute)?;
            }
            b'V' => {
                self.advance();
                self.vertical_lineto_argument_sequence(absolute)?;
            }
            b'C' => {
                self.advance();
                self.curveto_argument_sequence(absolute)?;
            }
            b'S' => {
                self.advance();
                self.smooth_curveto_argument_sequence(absolute)?;
            }
            b'Q' => {
                self.advance();
                self.quadratic_curveto_argument_sequence(absolute)?;
            }
            b'T' => {
                self.advance();
                self.smooth_quadratic_curveto_argument_sequence(absolute)?;
            }
            b'A' => {
                self.advance();
                self.elliptical_arc_argument_sequence(absolute)?;
            }
            c => {
                let pos = self.lookahead.map(|(pos, _)| pos).unwrap_or(0);
                return Err(ParseError::new(pos, ErrorKind::UnexpectedCommand(c)));
            }
        }

        Ok(true)
    }

    fn relative(&self, absolute: bool, x: f64, y: f64) -> (f64, f64) {
        if absolute {
            (x, y)
        } else {
            (x + self.current_x, y + self.current_y)
        }
    }

    fn lineto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let (x, y) = self.coordinate_pair()?;
            let (x, y) = self.relative(absolute, x, y);

            self.emit_line_to(x, y);

            if self.should_break_arg_sequence() {
                return Ok(());
            }
        }
    }

    fn horizontal_lineto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let x = self.match_number()?;
            let (x, y) = self.relative(absolute, x, 0.0);

            self.emit_line_to(x, if absolute { self.current_y } else { y });

            if self.should_break_arg_sequence() {
                return Ok(());
            }
        }
    }

    fn vertical_lineto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let y = self.match_number()?;
            let (x, y) = self.relative(absolute, 0.0, y);

            self.emit_line_to(if absolute { self.current_x } else { x }, y);

            if self.should_break_arg_sequence() {
                return Ok(());
            }
        }
    }

    fn curveto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let (x2, y2) = self.coordinate_pair()?;
            self.match_comma();
            let (x3, y3) = self.coordinate_pair()?;
            self.match_comma();
            let (x4, y4) = self.coordinate_pair()?;

            let (x2, y2) = self.relative(absolute, x2, y2);
            let (x3, y3) = self.relative(absolute, x3, y3);
            let (x4, y4) = self.relative(absolute, x4, y4);

            self.emit_curve_to(x2, y2, x3, y3, x4, y4);

            if self.should_break_arg_sequence() {
                return Ok(());
            }
        }
    }

    fn smooth_curveto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let (x3, y3) = self.coordinate_pair()?;
            self.match_comma();
            let (x4, y4) = self.coordinate_pair()?;

            let (x3, y3) = self.relative(absolute, x3, y3);
            let (x4, y4) = self.relative(absolute, x4, y4);

            let x2 = 2.0 * self.current_x - self.cubic_reflection_x;
            let y2 = 2.0 * self.current_y - self.cubic_reflection_y;

            self.emit_curve_to(x2, y2, x3, y3, x4, y4);

            if self.should_break_arg_sequence() {
                return Ok(());
            }
        }
    }

    fn quadratic_curveto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let (a, b) = self.coordinate_pair()?;
            self.match_comma();
            let (c, d) = self.coordinate_pair()?;

            let (a, b) = self.relative(absolute, a, b);
            let (c, d) = self.relative(absolute, c, d);

            self.emit_quadratic_curve_to(a, b, c, d);

            if self.should_break_arg_sequence() {
                return Ok(());
            }
        }
    }

    fn smooth_quadratic_curveto_argument_sequence(
        &mut self,
        absolute: bool,
    ) -> Result<(), ParseError> {
        loop {
            let (c, d) = self.coordinate_pair()?;
            let (c, d) = self.relative(absolute, c, d);

            let a = 2.0 * self.current_x - self.quadratic_reflection_x;
            let b = 2.0 * self.current_y - self.quadratic_reflection_y;

            self.emit_quadratic_curve_to(a, b, c, d);

            if self.should_break_arg_sequence() {
                return Ok(());
            }
        }
    }

    fn elliptical_arc_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let rx = self.match_number()?.abs();
            let ry = self.match_comma_number()?.abs();

            self.match_comma();
            let (x_axis_rotation, f1, f2) = self.match_number_and_flags()?;

            let large_arc = LargeArc(f1);
            let sweep = if f2 { Sweep::Positive } else { Sweep::Negative };

            self.match_comma();
            let (x, y) = self.coordinate_pair()?;
            let (x, y) = self.relative(absolute, x, y);

            self.builder
                .arc_to(rx, ry, x_axis_rotation, large_arc, sweep, x, y);
            self.set_current_point(x, y);

            if self.should_break_arg_sequence() {
                return Ok(());
            }
        }
    }
}

/// Parses path data into `builder`.
///
/// Commands are added as they are parsed, so on error the builder keeps everything
/// before the offending command.
pub fn parse_path(builder: &mut PathBuilder, path_str: &str) -> Result<(), ParseError> {
    PathParser::new(builder, path_str).parse()
}

/// Parses the `points` attribute into `builder`: a move-to to the first point and
/// line-tos to the rest, closed for polygons.
///
/// On error the points before it are kept and the path is not closed.
pub fn parse_points(
    builder: &mut PathBuilder,
    points: &str,
    close: bool,
) -> Result<(), ParseError> {
    let mut parser = PathParser::new(builder, points);
    let mut first = true;

    while parser.lookahead.is_some() {
        let (x, y) = parser.coordinate_pair()?;
        parser.match_comma();

        if first {
            parser.builder.move_to(x, y);
            first = false;
        } else {
            parser.builder.line_to(x, y);
        }
    }

    if close && !first {
        parser.builder.close_path();
    }

    Ok(())
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;
    use cairo::PathSegment;

    fn find_error_pos(s: &str) -> Option<usize> {
        s.find('^')
    }

    fn test_parser(
        path_str: &str,
        error_pos_str: &str,
        expected_segments: &[PathSegment],
        expected_error_kind: Option<ErrorKind>,
    ) {
        let mut builder = PathBuilder::new();
        let result = builder.parse(path_str);

        assert_eq!(expected_segments, builder.segments());

        match (find_error_pos(error_pos_str), expected_error_kind) {
            (Some(position), Some(kind)) => {
                assert_eq!(result, Err(ParseError { position, kind }))
            }
            (None, None) => assert_eq!(result, Ok(())),
            _ => panic!("bad test: error position and kind must go together"),
        }
    }

    fn moveto(x: f64, y: f64) -> PathSegment {
        PathSegment::MoveTo((x, y))
    }

    fn lineto(x: f64, y: f64) -> PathSegment {
        PathSegment::LineTo((x, y))
    }

    fn curveto(x2: f64, y2: f64, x3: f64, y3: f64, x4: f64, y4: f64) -> PathSegment {
        PathSegment::CurveTo((x2, y2), (x3, y3), (x4, y4))
    }

    fn closepath() -> PathSegment {
        PathSegment::ClosePath
    }

    #[test]
    fn handles_empty_data() {
        test_parser("", "", &[], None);
        test_parser("   ", "", &[], None);
    }

    #[test]
    fn handles_numbers() {
        test_parser("M 10 20", "", &[moveto(10.0, 20.0)], None);
        test_parser("M -10 -20", "", &[moveto(-10.0, -20.0)], None);
        test_parser("M .10 0.20", "", &[moveto(0.10, 0.20)], None);
        test_parser("M-.10-0.20", "", &[moveto(-0.10, -0.20)], None);
        test_parser("M10.5.50", "", &[moveto(10.5, 0.50)], None);
        test_parser("M.10.20", "", &[moveto(0.10, 0.20)], None);
        test_parser("M1e2.5", "", &[moveto(100.0, 0.5)], None);
        test_parser("M1E-1,2e+1", "", &[moveto(0.1, 20.0)], None);
    }

    #[test]
    fn handles_separators() {
        test_parser("M10,20", "", &[moveto(10.0, 20.0)], None);
        test_parser("M10 , 20", "", &[moveto(10.0, 20.0)], None);
        test_parser("M10\t\n\r20", "", &[moveto(10.0, 20.0)], None);
    }

    #[test]
    fn handles_implicit_lineto() {
        test_parser(
            "M10 20 30 40, 50 60",
            "",
            &[moveto(10.0, 20.0), lineto(30.0, 40.0), lineto(50.0, 60.0)],
            None,
        );

        test_parser(
            "m10 20 30 40",
            "",
            &[moveto(10.0, 20.0), lineto(40.0, 60.0)],
            None,
        );
    }

    #[test]
    fn handles_relative_moveto_after_closepath() {
        test_parser(
            "M10 20 L 30 40 z m 5 5 l 1 1",
            "",
            &[
                moveto(10.0, 20.0),
                lineto(30.0, 40.0),
                closepath(),
                moveto(15.0, 25.0),
                lineto(16.0, 26.0),
            ],
            None,
        );
    }

    #[test]
    fn handles_horizontal_and_vertical_lineto() {
        test_parser(
            "M10 20 H30 V40 h5 v-5",
            "",
            &[
                moveto(10.0, 20.0),
                lineto(30.0, 20.0),
                lineto(30.0, 40.0),
                lineto(35.0, 40.0),
                lineto(35.0, 35.0),
            ],
            None,
        );

        test_parser(
            "M10 20 H30 40",
            "",
            &[moveto(10.0, 20.0), lineto(30.0, 20.0), lineto(40.0, 20.0)],
            None,
        );
    }

    #[test]
    fn handles_curveto() {
        test_parser(
            "M10 20 C 30 40 50 60 70 80",
            "",
            &[moveto(10.0, 20.0), curveto(30.0, 40.0, 50.0, 60.0, 70.0, 80.0)],
            None,
        );

        test_parser(
            "M10 20 c 1 2 3 4 5 6",
            "",
            &[moveto(10.0, 20.0), curveto(11.0, 22.0, 13.0, 24.0, 15.0, 26.0)],
            None,
        );
    }

    #[test]
    fn handles_smooth_curveto() {
        test_parser(
            "M10 20 C 30 40 50 60 70 80 S 110 120 130 140",
            "",
            &[
                moveto(10.0, 20.0),
                curveto(30.0, 40.0, 50.0, 60.0, 70.0, 80.0),
                curveto(90.0, 100.0, 110.0, 120.0, 130.0, 140.0),
            ],
            None,
        );

        // Without a previous curve, the first control point is the current point.
        test_parser(
            "M10 20 S 30 40 50 60",
            "",
            &[moveto(10.0, 20.0), curveto(10.0, 20.0, 30.0, 40.0, 50.0, 60.0)],
            None,
        );
    }

    #[test]
    fn handles_quadratic_curveto() {
        test_parser(
            "M0 0 Q 3 3 6 0",
            "",
            &[moveto(0.0, 0.0), curveto(2.0, 2.0, 4.0, 2.0, 6.0, 0.0)],
            None,
        );

        test_parser(
            "M0 0 Q 3 3 6 0 T 12 0",
            "",
            &[
                moveto(0.0, 0.0),
                curveto(2.0, 2.0, 4.0, 2.0, 6.0, 0.0),
                curveto(8.0, -2.0, 10.0, -2.0, 12.0, 0.0),
            ],
            None,
        );
    }

    #[test]
    fn handles_arc_flags_without_separators() {
        let mut builder = PathBuilder::new();
        assert!(builder.parse("M0 0 a10 10 0 0120 0").is_ok());
        assert_eq!(builder.segments().len(), 3);
        assert_eq!(builder.current_point(), (20.0, 0.0));

        let mut builder = PathBuilder::new();
        assert!(builder.parse("M0 0 A10,10,0,1,1,20,0").is_ok());
    }

    #[test]
    fn zero_radius_arc_is_a_line() {
        test_parser(
            "M10 20 A0 5 0 0 1 30 40",
            "",
            &[moveto(10.0, 20.0), lineto(30.0, 40.0)],
            None,
        );
    }

    #[test]
    fn first_command_must_be_moveto() {
        test_parser(
            "L10 20",
            "^",
            &[],
            Some(ErrorKind::UnexpectedCommand(b'L')),
        );

        test_parser(
            "  10 20",
            "  ^",
            &[],
            Some(ErrorKind::UnexpectedToken(Number(10.0))),
        );
    }

    #[test]
    fn keeps_segments_before_error() {
        test_parser(
            "M10 20 L30 40 L50",
            "                 ^",
            &[moveto(10.0, 20.0), lineto(30.0, 40.0)],
            Some(ErrorKind::UnexpectedEof),
        );

        test_parser(
            "M10 20 L30 40 X 1 2",
            "              ^",
            &[moveto(10.0, 20.0), lineto(30.0, 40.0)],
            Some(ErrorKind::UnexpectedCommand(b'X')),
        );

        test_parser(
            "M10 20 L30 40 #",
            "              ^",
            &[moveto(10.0, 20.0), lineto(30.0, 40.0)],
            Some(ErrorKind::LexError(LexError::UnexpectedByte(b'#'))),
        );
    }

    #[test]
    fn rejects_bad_flags() {
        let mut builder = PathBuilder::new();
        assert!(builder.parse("M0 0 A10 10 0 2 1 20 0").is_err());
        assert_eq!(builder.segments(), &[moveto(0.0, 0.0)]);
    }

    #[test]
    fn rejects_trailing_comma() {
        test_parser(
            "M10 20,",
            "       ^",
            &[moveto(10.0, 20.0)],
            Some(ErrorKind::UnexpectedEof),
        );
    }

    #[test]
    fn parses_points() {
        let mut builder = PathBuilder::new();
        assert!(parse_points(&mut builder, "0,0 10,0 10 10", true).is_ok());
        assert_eq!(
            builder.segments(),
            &[moveto(0.0, 0.0), lineto(10.0, 0.0), lineto(10.0, 10.0), closepath()]
        );

        let mut builder = PathBuilder::new();
        assert!(parse_points(&mut builder, "0,0 10,0", false).is_ok());
        assert_eq!(builder.segments(), &[moveto(0.0, 0.0), lineto(10.0, 0.0)]);
    }

    #[test]
    fn points_keep_prefix_on_error() {
        let mut builder = PathBuilder::new();
        assert!(parse_points(&mut builder, "0,0 10,0 10", true).is_err());
        assert_eq!(builder.segments(), &[moveto(0.0, 0.0), lineto(10.0, 0.0)]);

        let mut builder = PathBuilder::new();
        assert!(parse_points(&mut builder, "", true).is_ok());
        assert!(builder.is_empty());
    }
}
