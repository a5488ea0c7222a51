// ===============================================
// Metadata — compiler v0.1.0
// ===============================================
// _component_:     translator
// _description_:   Recursive-descent parser fused with VM code generation:
//                  each grammar production both consumes the tokens it
//                  covers and emits the VM instructions that implement it,
//                  in a single pass with no intermediate parse tree.
//
// _notes_:
// - Method names follow the Jack grammar's nonterminals one-for-one so the
//   structure can be checked against the grammar directly.
// - Label names are never reused: `label_count` only ever increments.
// - One `SymbolTable` instance lives for the whole class: it holds the
//   class scope (`static`/`field`) for the class's lifetime and the
//   subroutine scope (`argument`/`local`), which is reset at each
//   subroutine's entry via `start_subroutine` (spec §3/§4.2).
// ===============================================

use std::io::Write;

use crate::error::{CompileError, CompileResult, Position};
use crate::symbol_table::{ClassVarKind, SubroutineVarKind, SymbolTable};
use crate::token::{first_set, Command, Keyword, Segment, Symbol, Token, TokenKind};
use crate::tokenizer::TokenStream;
use crate::vm_writer::VmWriter;

/// Translates one already-tokenized class into VM instructions written to
/// `sink`. Returns the class name that was compiled, so callers can
/// validate it against the source file's name (spec §6).
pub fn compile_class<W: Write>(
    tokens: TokenStream,
    sink: W,
    debug_log: Option<&DebugLog>,
) -> CompileResult<String> {
    let mut compiler = Compiler {
        tokens,
        symbols: SymbolTable::new(),
        writer: VmWriter::new(sink),
        class_name: String::new(),
        label_count: 0,
        debug_log,
    };
    compiler.compile_class()?;
    compiler.writer.close()?;
    Ok(compiler.class_name)
}

/// Where (and whether) to append `debug_mode` symbol-table dumps. A thin
/// wrapper so `compiler.rs` doesn't need to know about file paths when the
/// feature is off.
pub struct DebugLog {
    path: std::path::PathBuf,
}

impl DebugLog {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        DebugLog { path: path.into() }
    }

    #[cfg(feature = "debug_mode")]
    fn record(&self, tag: &str, body: String) {
        let entry = diagnostics::LogEntry::new(diagnostics::Kind::Dump, tag, body);
        let _ = diagnostics::append(&self.path, &entry);
    }

    #[cfg(not(feature = "debug_mode"))]
    fn record(&self, _tag: &str, _body: String) {}
}

struct Compiler<'a, W: Write> {
    tokens: TokenStream,
    symbols: SymbolTable,
    writer: VmWriter<W>,
    class_name: String,
    label_count: u32,
    debug_log: Option<&'a DebugLog>,
}

impl<'a, W: Write> Compiler<'a, W> {
    // ---- token-stream helpers -------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.peek()
    }

    fn peek_second(&self) -> Option<&Token> {
        self.tokens.peek_second()
    }

    fn advance(&mut self) -> CompileResult<Token> {
        self.tokens
            .advance()
            .ok_or_else(|| CompileError::Syntactic {
                message: "unexpected end of input".to_string(),
                at: None,
            })
    }

    fn peek_position(&self) -> Option<Position> {
        self.peek().map(Token::position)
    }

    fn next_is_keyword(&self, keyword: Keyword) -> bool {
        self.peek().and_then(Token::as_keyword) == Some(keyword)
    }

    fn next_is_symbol(&self, symbol: Symbol) -> bool {
        self.peek().and_then(Token::as_symbol) == Some(symbol)
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> CompileResult<()> {
        let at = self.peek_position();
        let token = self.advance()?;
        if token.as_keyword() == Some(keyword) {
            Ok(())
        } else {
            Err(CompileError::expected(
                &TokenKind::Keyword.to_string(),
                keyword.as_str(),
                at,
            ))
        }
    }

    fn expect_any_keyword(&mut self) -> CompileResult<Keyword> {
        let at = self.peek_position();
        let token = self.advance()?;
        token
            .as_keyword()
            .ok_or_else(|| CompileError::expected_any(&TokenKind::Keyword.to_string(), at))
    }

    fn expect_symbol(&mut self, symbol: Symbol) -> CompileResult<()> {
        let at = self.peek_position();
        let token = self.advance()?;
        if token.as_symbol() == Some(symbol) {
            Ok(())
        } else {
            Err(CompileError::expected(
                &TokenKind::Symbol.to_string(),
                &symbol.to_string(),
                at,
            ))
        }
    }

    fn expect_any_symbol(&mut self) -> CompileResult<Symbol> {
        let at = self.peek_position();
        let token = self.advance()?;
        token
            .as_symbol()
            .ok_or_else(|| CompileError::expected_any(&TokenKind::Symbol.to_string(), at))
    }

    fn expect_identifier(&mut self) -> CompileResult<String> {
        let at = self.peek_position();
        let token = self.advance()?;
        match token {
            Token::Identifier(name, _) => Ok(name),
            _ => Err(CompileError::expected_any(
                &TokenKind::Identifier.to_string(),
                at,
            )),
        }
    }

    /// `int | char | boolean | className`, as used by a variable declaration.
    fn expect_var_type(&mut self) -> CompileResult<String> {
        let at = self.peek_position();
        match self.peek() {
            Some(t) if first_set::is_type_start(t) => {
                let token = self.advance()?;
                Ok(match token {
                    Token::Keyword(kw, _) => kw.as_str().to_string(),
                    Token::Identifier(name, _) => name,
                    _ => unreachable!("is_type_start guards this"),
                })
            }
            _ => Err(CompileError::expected_any("type", at)),
        }
    }

    /// `void | int | char | boolean | className`, as used by a subroutine
    /// declaration's return type.
    fn expect_return_type(&mut self) -> CompileResult<String> {
        if self.next_is_keyword(Keyword::Void) {
            self.advance()?;
            return Ok("void".to_string());
        }
        self.expect_var_type()
    }

    fn next_label(&mut self) -> String {
        let label = format!("L{}", self.label_count);
        self.label_count += 1;
        label
    }

    fn next_label_pair(&mut self) -> (String, String) {
        (self.next_label(), self.next_label())
    }

    /// Resolves `name` against the symbol table (subroutine scope shadows
    /// class scope; spec §3 "Scope resolution").
    fn resolve(&self, name: &str) -> CompileResult<crate::symbol_table::Entry> {
        self.symbols
            .resolve(name)
            .cloned()
            .ok_or_else(|| CompileError::undefined_symbol(name))
    }

    // ---- class-level productions -----------------------------------------------

    fn compile_class(&mut self) -> CompileResult<()> {
        self.expect_keyword(Keyword::Class)?;
        self.class_name = self.expect_identifier()?;
        self.expect_symbol(Symbol::CurlyL)?;

        while self.peek().map(first_set::is_class_var_dec_start) == Some(true) {
            self.compile_class_var_dec()?;
        }

        while self.peek().map(first_set::is_subroutine_dec_start) == Some(true) {
            self.compile_subroutine()?;
        }

        self.expect_symbol(Symbol::CurlyR)?;

        if let Some(log) = self.debug_log {
            log.record(
                &format!("{} class", self.class_name),
                self.symbols.dump_class_scope(),
            );
        }

        Ok(())
    }

    fn compile_class_var_dec(&mut self) -> CompileResult<()> {
        let kind_kw = self.expect_any_keyword()?;
        let kind = match kind_kw {
            Keyword::Static => ClassVarKind::Static,
            Keyword::Field => ClassVarKind::Field,
            _ => {
                return Err(CompileError::expected(
                    &TokenKind::Keyword.to_string(),
                    "static",
                    None,
                ))
            }
        };
        let ty = self.expect_var_type()?;

        loop {
            let name = self.expect_identifier()?;
            self.symbols.define_class_var(&name, &ty, kind)?;

            if !self.next_is_symbol(Symbol::Comma) {
                break;
            }
            self.expect_symbol(Symbol::Comma)?;
        }

        self.expect_symbol(Symbol::Semicolon)?;
        Ok(())
    }

    fn compile_subroutine(&mut self) -> CompileResult<()> {
        let kind = self.expect_any_keyword()?;
        if !matches!(
            kind,
            Keyword::Constructor | Keyword::Function | Keyword::Method
        ) {
            return Err(CompileError::expected_any(&TokenKind::Keyword.to_string(), None));
        }
        self.expect_return_type()?;
        let name = self.expect_identifier()?;

        self.symbols.start_subroutine();
        if kind == Keyword::Method {
            self.symbols.define_this_receiver(&self.class_name)?;
        }

        self.expect_symbol(Symbol::ParenL)?;
        self.compile_parameter_list()?;
        self.expect_symbol(Symbol::ParenR)?;

        self.compile_subroutine_body(&name, kind)?;

        if let Some(log) = self.debug_log {
            log.record(&format!("{name} method"), self.symbols.dump_subroutine_scope());
        }

        Ok(())
    }

    fn compile_parameter_list(&mut self) -> CompileResult<()> {
        if self.next_is_symbol(Symbol::ParenR) {
            return Ok(());
        }

        loop {
            let ty = self.expect_var_type()?;
            let name = self.expect_identifier()?;
            self.symbols
                .define_subroutine_var(&name, &ty, SubroutineVarKind::Argument)?;

            if !self.next_is_symbol(Symbol::Comma) {
                break;
            }
            self.expect_symbol(Symbol::Comma)?;
        }

        Ok(())
    }

    fn compile_subroutine_body(&mut self, name: &str, kind: Keyword) -> CompileResult<()> {
        self.expect_symbol(Symbol::CurlyL)?;

        while self.next_is_keyword(Keyword::Var) {
            self.compile_var_dec()?;
        }

        self.emit_function_header(name, kind)?;
        self.compile_statements()?;

        self.expect_symbol(Symbol::CurlyR)?;
        Ok(())
    }

    fn compile_var_dec(&mut self) -> CompileResult<()> {
        self.expect_keyword(Keyword::Var)?;
        let ty = self.expect_var_type()?;

        loop {
            let name = self.expect_identifier()?;
            self.symbols
                .define_subroutine_var(&name, &ty, SubroutineVarKind::Local)?;

            if !self.next_is_symbol(Symbol::Comma) {
                break;
            }
            self.expect_symbol(Symbol::Comma)?;
        }

        self.expect_symbol(Symbol::Semicolon)?;
        Ok(())
    }

    fn emit_function_header(&mut self, name: &str, kind: Keyword) -> CompileResult<()> {
        let function_name = format!("{}.{name}", self.class_name);
        let local_count = self.symbols.var_count(Segment::Local);
        self.writer.write_function(&function_name, local_count)?;

        match kind {
            Keyword::Constructor => {
                let field_count = self.symbols.var_count(Segment::This);
                self.writer.write_constant(field_count)?;
                self.writer.write_call("Memory.alloc", 1)?;
                self.writer.write_pop_this_ptr()?;
            }
            Keyword::Method => {
                let entry = self
                    .symbols
                    .resolve("this")
                    .expect("method prologue always defines `this` at argument 0");
                self.writer.write_push(entry.segment, entry.index)?;
                self.writer.write_pop_this_ptr()?;
            }
            _ => {}
        }

        Ok(())
    }

    // ---- statements --------------------------------------------------------

    fn compile_statements(&mut self) -> CompileResult<()> {
        while self.peek().map(first_set::is_statement_start) == Some(true) {
            match self.expect_any_keyword_peeked() {
                Keyword::Let => self.compile_let()?,
                Keyword::If => self.compile_if()?,
                Keyword::While => self.compile_while()?,
                Keyword::Do => self.compile_do()?,
                Keyword::Return => self.compile_return()?,
                _ => unreachable!("is_statement_start guards this"),
            }
        }
        Ok(())
    }

    /// Reads the statement keyword without consuming it (dispatch only).
    fn expect_any_keyword_peeked(&self) -> Keyword {
        self.peek()
            .and_then(Token::as_keyword)
            .expect("caller already confirmed this is a statement keyword")
    }

    fn compile_let(&mut self) -> CompileResult<()> {
        self.expect_keyword(Keyword::Let)?;
        let name = self.expect_identifier()?;
        let entry = self.resolve(&name)?;

        if self.next_is_symbol(Symbol::SquareL) {
            self.writer.write_push(entry.segment, entry.index)?;

            self.expect_symbol(Symbol::SquareL)?;
            self.compile_expression()?;
            self.expect_symbol(Symbol::SquareR)?;

            self.writer.write_arithmetic(Command::Add)?;

            self.expect_symbol(Symbol::Equal)?;
            self.compile_expression()?;
            self.expect_symbol(Symbol::Semicolon)?;

            self.writer.write_pop(Segment::Temp, 0)?;
            self.writer.write_pop_that_ptr()?;
            self.writer.write_push(Segment::Temp, 0)?;
            self.writer.write_pop(Segment::That, 0)?;
        } else {
            self.expect_symbol(Symbol::Equal)?;
            self.compile_expression()?;
            self.expect_symbol(Symbol::Semicolon)?;

            self.writer.write_pop(entry.segment, entry.index)?;
        }

        Ok(())
    }

    fn compile_if(&mut self) -> CompileResult<()> {
        let (else_label, end_label) = self.next_label_pair();

        self.expect_keyword(Keyword::If)?;
        self.expect_symbol(Symbol::ParenL)?;
        self.compile_expression()?;
        self.expect_symbol(Symbol::ParenR)?;

        self.writer.write_arithmetic(Command::Not)?;
        self.writer.write_if_goto(&else_label)?;

        self.expect_symbol(Symbol::CurlyL)?;
        self.compile_statements()?;
        self.expect_symbol(Symbol::CurlyR)?;

        self.writer.write_goto(&end_label)?;
        self.writer.write_label(&else_label)?;

        if self.next_is_keyword(Keyword::Else) {
            self.expect_keyword(Keyword::Else)?;
            self.expect_symbol(Symbol::CurlyL)?;
            self.compile_statements()?;
            self.expect_symbol(Symbol::CurlyR)?;
        }

        self.writer.write_label(&end_label)?;
        Ok(())
    }

    fn compile_while(&mut self) -> CompileResult<()> {
        let (loop_label, exit_label) = self.next_label_pair();

        self.expect_keyword(Keyword::While)?;
        self.writer.write_label(&loop_label)?;

        self.expect_symbol(Symbol::ParenL)?;
        self.compile_expression()?;
        self.expect_symbol(Symbol::ParenR)?;

        self.writer.write_arithmetic(Command::Not)?;
        self.writer.write_if_goto(&exit_label)?;

        self.expect_symbol(Symbol::CurlyL)?;
        self.compile_statements()?;
        self.expect_symbol(Symbol::CurlyR)?;

        self.writer.write_goto(&loop_label)?;
        self.writer.write_label(&exit_label)?;
        Ok(())
    }

    fn compile_do(&mut self) -> CompileResult<()> {
        self.expect_keyword(Keyword::Do)?;
        self.compile_subroutine_call()?;
        self.expect_symbol(Symbol::Semicolon)?;

        self.writer.write_pop(Segment::Temp, 0)?;
        Ok(())
    }

    fn compile_return(&mut self) -> CompileResult<()> {
        self.expect_keyword(Keyword::Return)?;

        if self.next_is_symbol(Symbol::Semicolon) {
            self.writer.write_constant(0)?;
        } else {
            self.compile_expression()?;
        }

        self.expect_symbol(Symbol::Semicolon)?;
        self.writer.write_return()?;
        Ok(())
    }

    // ---- expressions --------------------------------------------------------

    fn compile_expression(&mut self) -> CompileResult<()> {
        self.compile_term()?;

        while let Some(symbol) = self.peek().and_then(Token::as_symbol) {
            if !first_set::is_binary_op(symbol) {
                break;
            }
            self.expect_any_symbol()?;
            self.compile_term()?;

            match symbol {
                Symbol::Plus => self.writer.write_arithmetic(Command::Add)?,
                Symbol::Minus => self.writer.write_arithmetic(Command::Sub)?,
                Symbol::Equal => self.writer.write_arithmetic(Command::Eq)?,
                Symbol::GreaterThan => self.writer.write_arithmetic(Command::Gt)?,
                Symbol::LessThan => self.writer.write_arithmetic(Command::Lt)?,
                Symbol::Ampersand => self.writer.write_arithmetic(Command::And)?,
                Symbol::Pipe => self.writer.write_arithmetic(Command::Or)?,
                Symbol::Star => self.writer.write_call("Math.multiply", 2)?,
                Symbol::Slash => self.writer.write_call("Math.divide", 2)?,
                _ => unreachable!("is_binary_op guards this"),
            }
        }

        Ok(())
    }

    fn compile_term(&mut self) -> CompileResult<()> {
        let at = self.peek_position();
        match self.peek() {
            Some(Token::IntConst(..)) => {
                let value = match self.advance()? {
                    Token::IntConst(v, _) => v,
                    _ => unreachable!(),
                };
                self.writer.write_constant(value)?;
            }
            Some(Token::StringConst(..)) => {
                let text = match self.advance()? {
                    Token::StringConst(s, _) => s,
                    _ => unreachable!(),
                };
                self.writer.write_constant(text.chars().count() as u16)?;
                self.writer.write_call("String.new", 1)?;
                for ch in text.chars() {
                    self.writer.write_constant(ch as u16)?;
                    self.writer.write_call("String.appendChar", 2)?;
                }
            }
            Some(Token::Keyword(kw, _)) if first_set::is_keyword_constant(*kw) => {
                self.compile_keyword_const()?;
            }
            Some(Token::Identifier(..)) => {
                let is_index = self
                    .peek_second()
                    .and_then(Token::as_symbol)
                    .map(|s| s == Symbol::SquareL)
                    == Some(true);
                let is_call = self
                    .peek_second()
                    .and_then(Token::as_symbol)
                    .map(|s| s == Symbol::Dot || s == Symbol::ParenL)
                    == Some(true);

                if is_index {
                    let name = self.expect_identifier()?;
                    let entry = self.resolve(&name)?;
                    self.writer.write_push(entry.segment, entry.index)?;

                    self.expect_symbol(Symbol::SquareL)?;
                    self.compile_expression()?;
                    self.expect_symbol(Symbol::SquareR)?;

                    self.writer.write_arithmetic(Command::Add)?;
                    self.writer.write_pop_that_ptr()?;
                    self.writer.write_push(Segment::That, 0)?;
                } else if is_call {
                    self.compile_subroutine_call()?;
                } else {
                    let name = self.expect_identifier()?;
                    let entry = self.resolve(&name)?;
                    self.writer.write_push(entry.segment, entry.index)?;
                }
            }
            Some(Token::Symbol(Symbol::ParenL, _)) => {
                self.expect_symbol(Symbol::ParenL)?;
                self.compile_expression()?;
                self.expect_symbol(Symbol::ParenR)?;
            }
            Some(Token::Symbol(sym, _)) if first_set::is_unary_op(*sym) => {
                let op = self.expect_any_symbol()?;
                self.compile_term()?;
                let command = if op == Symbol::Minus {
                    Command::Neg
                } else {
                    Command::Not
                };
                self.writer.write_arithmetic(command)?;
            }
            _ => return Err(CompileError::expected_any("term", at)),
        }

        Ok(())
    }

    fn compile_expression_list(&mut self) -> CompileResult<u16> {
        let mut count = 0;

        if self.next_is_symbol(Symbol::ParenR) {
            return Ok(0);
        }

        self.compile_expression()?;
        count += 1;

        while self.next_is_symbol(Symbol::Comma) {
            self.expect_symbol(Symbol::Comma)?;
            self.compile_expression()?;
            count += 1;
        }

        Ok(count)
    }

    /// `subroutineName '(' expressionList ')'` or
    /// `( varName | className ) '.' subroutineName '(' expressionList ')'`.
    ///
    /// An unqualified call is an internal method: the current object is
    /// pushed as the implicit first argument. A call qualified by a known
    /// variable name is an external method: that variable's value is
    /// pushed as the first argument and its declared type names the
    /// target class. A call qualified by an unknown name is an external
    /// function on that class: no implicit argument is pushed.
    fn compile_subroutine_call(&mut self) -> CompileResult<()> {
        let mut class_name = self.class_name.clone();
        let mut arg_count = 1;

        let qualified = self.peek_second().and_then(Token::as_symbol) == Some(Symbol::Dot);

        if qualified {
            let qualifier = self
                .peek()
                .and_then(Token::as_identifier)
                .map(str::to_string);

            match qualifier.as_deref().map(|n| self.resolve(n)) {
                Some(Ok(entry)) => {
                    self.expect_identifier()?; // consume the variable name
                    self.writer.write_push(entry.segment, entry.index)?;
                    class_name = entry.ty.clone();
                }
                _ => {
                    class_name = self.expect_identifier()?;
                    arg_count = 0;
                }
            }

            self.expect_symbol(Symbol::Dot)?;
        } else {
            self.writer.write_push_this_ptr()?;
        }

        let subroutine_name = self.expect_identifier()?;

        self.expect_symbol(Symbol::ParenL)?;
        arg_count += self.compile_expression_list()?;
        self.expect_symbol(Symbol::ParenR)?;

        let function_name = format!("{class_name}.{subroutine_name}");
        self.writer.write_call(&function_name, arg_count)?;
        Ok(())
    }

    fn compile_keyword_const(&mut self) -> CompileResult<()> {
        let keyword = self.expect_any_keyword()?;
        match keyword {
            Keyword::True => {
                self.writer.write_constant(1)?;
                self.writer.write_arithmetic(Command::Neg)?;
            }
            Keyword::This => {
                self.writer.write_push_this_ptr()?;
            }
            Keyword::False | Keyword::Null => {
                self.writer.write_constant(0)?;
            }
            _ => unreachable!("is_keyword_constant guards this"),
        }
        Ok(())
    }
}
