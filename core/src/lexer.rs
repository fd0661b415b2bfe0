use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\f]+")] // Skip whitespace
#[logos(skip r"//[^\n]*")]  // Skip line comments
pub enum Token {
    // Keywords
    #[token("let")]
    Let,
    #[token("think")]
    Think,
    #[token("gate")]
    Gate,
    #[token("print")]
    Print,
    #[token("agent")]
    Agent,
    #[token("tool")]
    Tool,
    #[token("task")]
    Task,
    #[token("allow")]
    Allow,
    #[token("spawn")]
    Spawn,
    #[token("delegate")]
    Delegate,
    #[token("permission")]
    Permission,
    #[token("timeout")]
    Timeout,
    #[token("main")]
    Main,
    #[token("return")]
    Return,
    #[token("else")]
    Else,

    // Sigils
    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    VarIdent(String),
    
    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    AgentIdent(String),

    // Literals
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    String(String),

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    // Symbols
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("=")]
    Assign,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("->")]
    Arrow,
    #[token(".")]
    Dot,
}
