use crate::connection::Connection;
use crate::error::{OrgError, Result};
use crate::model::{Identity, SaveError, WriteOutcome};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

const DEFAULT_API_VERSION: &str = "59.0";

#[derive(Default)]
struct OrgState {
    records: HashMap<String, Vec<Map<String, Value>>>,
    next_id: u64,
    api_version: String,
    queries: Vec<String>,
    posts: Vec<(String, Value)>,
    post_response: Value,
    rejections: HashMap<String, SaveError>,
    transport_down: bool,
}

/// In-process org for tests.
///
/// Holds records per object type, answers the `SELECT … FROM … WHERE …` subset
/// the resolvers emit (equality terms joined by `AND`/`OR`, with parentheses),
/// and enforces the uniqueness constraint on permission set assignments.
///
/// Uses a `Mutex` for interior mutability so the `Connection` trait can take
/// `&self` and the org stays `Send + Sync`.
pub struct InMemoryOrg {
    identity: Identity,
    instance_url: String,
    access_token: String,
    state: Mutex<OrgState>,
}

impl InMemoryOrg {
    /// New org authenticated as `username`, whose User record already exists.
    pub fn new(username: &str) -> Self {
        let mut org = Self {
            identity: Identity {
                username: username.to_string(),
                user_id: String::new(),
                organization_id: "00D000000000001".to_string(),
            },
            instance_url: "https://memory.my.salesforce.com".to_string(),
            access_token: "memory-token".to_string(),
            state: Mutex::new(OrgState {
                api_version: DEFAULT_API_VERSION.to_string(),
                post_response: json!({}),
                ..Default::default()
            }),
        };
        org.identity.user_id = org.insert("User", json!({"Username": username}));
        org
    }

    fn state(&self) -> MutexGuard<'_, OrgState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed a record; returns its generated id.
    pub fn insert(&self, object: &str, fields: Value) -> String {
        let mut state = self.state();
        let id = next_id(&mut state, object);
        let mut record = fields.as_object().cloned().unwrap_or_default();
        record.insert("Id".to_string(), Value::String(id.clone()));
        state
            .records
            .entry(object.to_ascii_lowercase())
            .or_default()
            .push(record);
        id
    }

    pub fn records(&self, object: &str) -> Vec<Value> {
        self.state()
            .records
            .get(&object.to_ascii_lowercase())
            .map(|rs| rs.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    pub fn queries(&self) -> Vec<String> {
        self.state().queries.clone()
    }

    pub fn posts(&self) -> Vec<(String, Value)> {
        self.state().posts.clone()
    }

    pub fn set_api_version(&self, version: &str) {
        self.state().api_version = version.to_string();
    }

    pub fn set_post_response(&self, response: Value) {
        self.state().post_response = response;
    }

    /// Make every create of `object` fail with the given reason.
    pub fn reject_creates(&self, object: &str, code: &str, message: &str) {
        self.state().rejections.insert(
            object.to_ascii_lowercase(),
            SaveError {
                code: code.to_string(),
                message: message.to_string(),
                fields: Vec::new(),
            },
        );
    }

    /// Simulate the network going away for every subsequent call.
    pub fn set_transport_down(&self, down: bool) {
        self.state().transport_down = down;
    }

    fn check_transport(state: &OrgState) -> Result<()> {
        if state.transport_down {
            return Err(OrgError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

fn next_id(state: &mut OrgState, object: &str) -> String {
    state.next_id += 1;
    let prefix = match object.to_ascii_lowercase().as_str() {
        "user" => "005",
        "permissionset" => "0PS",
        "permissionsetassignment" => "0Pa",
        "collaborationgroup" => "0F9",
        "contentversion" => "068",
        "contentdocument" => "069",
        _ => "a00",
    };
    format!("{}{:012}", prefix, state.next_id)
}

fn duplicate_of(state: &OrgState, object: &str, fields: &Map<String, Value>) -> Option<String> {
    if object != "permissionsetassignment" {
        return None;
    }
    let key = |r: &Map<String, Value>| {
        (
            r.get("PermissionSetId").cloned(),
            r.get("AssigneeId").cloned(),
        )
    };
    let wanted = key(fields);
    state.records.get(object).and_then(|rs| {
        rs.iter()
            .find(|r| key(r) == wanted)
            .and_then(|r| r.get("Id").and_then(Value::as_str).map(str::to_string))
    })
}

#[async_trait]
impl Connection for InMemoryOrg {
    fn access_token(&self) -> &str {
        &self.access_token
    }

    fn instance_url(&self) -> &str {
        &self.instance_url
    }

    fn api_version(&self) -> String {
        self.state().api_version.clone()
    }

    async fn identity(&self) -> Result<Identity> {
        Self::check_transport(&self.state())?;
        Ok(self.identity.clone())
    }

    async fn query(&self, soql: &str) -> Result<Vec<Value>> {
        let mut state = self.state();
        Self::check_transport(&state)?;
        state.queries.push(soql.to_string());

        let parsed = soql::parse(soql).map_err(|message| OrgError::Http {
            status: 400,
            body: format!("MALFORMED_QUERY: {}", message),
        })?;

        let rows = state
            .records
            .get(&parsed.object.to_ascii_lowercase())
            .map(|rs| rs.as_slice())
            .unwrap_or_default();

        Ok(rows
            .iter()
            .filter(|r| parsed.filter.as_ref().map_or(true, |c| c.matches(r)))
            .map(|r| parsed.project(r))
            .collect())
    }

    async fn create(&self, sobject: &str, fields: Value) -> Result<WriteOutcome> {
        let mut state = self.state();
        Self::check_transport(&state)?;
        let object = sobject.to_ascii_lowercase();

        if let Some(rejection) = state.rejections.get(&object) {
            return Ok(WriteOutcome::Rejected(rejection.clone()));
        }

        let mut record = fields.as_object().cloned().unwrap_or_default();
        if let Some(existing) = duplicate_of(&state, &object, &record) {
            return Ok(WriteOutcome::Rejected(SaveError {
                code: "DUPLICATE_VALUE".to_string(),
                message: format!(
                    "duplicate value found: PermissionSetId duplicates value on record with id: {}",
                    existing
                ),
                fields: Vec::new(),
            }));
        }

        if object == "contentversion" && !record.contains_key("ContentDocumentId") {
            let document_id = next_id(&mut state, "ContentDocument");
            record.insert("ContentDocumentId".to_string(), Value::String(document_id));
        }

        let id = next_id(&mut state, sobject);
        record.insert("Id".to_string(), Value::String(id.clone()));
        state.records.entry(object).or_default().push(record);
        Ok(WriteOutcome::Created { id })
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        let mut state = self.state();
        Self::check_transport(&state)?;
        state.posts.push((url.to_string(), body.clone()));
        Ok(state.post_response.clone())
    }
}

/// The query subset the in-memory org understands.
mod soql {
    use serde_json::{json, Map, Value};

    #[derive(Debug, Clone, PartialEq)]
    enum Token {
        Word(String),
        Literal(String),
        Comma,
        Equals,
        Open,
        Close,
    }

    #[derive(Debug)]
    pub(super) enum Condition {
        Equals(String, String),
        And(Box<Condition>, Box<Condition>),
        Or(Box<Condition>, Box<Condition>),
    }

    impl Condition {
        pub(super) fn matches(&self, record: &Map<String, Value>) -> bool {
            match self {
                Condition::Equals(field, literal) => lookup(record, field)
                    .and_then(Value::as_str)
                    .is_some_and(|v| v == literal),
                Condition::And(a, b) => a.matches(record) && b.matches(record),
                Condition::Or(a, b) => a.matches(record) || b.matches(record),
            }
        }
    }

    pub(super) struct Select {
        pub fields: Vec<String>,
        pub object: String,
        pub filter: Option<Condition>,
    }

    impl Select {
        pub(super) fn project(&self, record: &Map<String, Value>) -> Value {
            let mut out = Map::new();
            out.insert("attributes".to_string(), json!({ "type": self.object }));
            for field in &self.fields {
                let value = lookup(record, field).cloned().unwrap_or(Value::Null);
                out.insert(field.clone(), value);
            }
            Value::Object(out)
        }
    }

    fn lookup<'a>(record: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
        record
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(field))
            .map(|(_, v)| v)
    }

    fn tokenize(input: &str) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        let mut chars = input.chars().peekable();
        while let Some(&c) = chars.peek() {
            match c {
                c if c.is_whitespace() => {
                    chars.next();
                }
                ',' => {
                    chars.next();
                    tokens.push(Token::Comma);
                }
                '=' => {
                    chars.next();
                    tokens.push(Token::Equals);
                }
                '(' => {
                    chars.next();
                    tokens.push(Token::Open);
                }
                ')' => {
                    chars.next();
                    tokens.push(Token::Close);
                }
                '\'' => {
                    chars.next();
                    let mut literal = String::new();
                    loop {
                        match chars.next() {
                            Some('\\') => match chars.next() {
                                Some('n') => literal.push('\n'),
                                Some('r') => literal.push('\r'),
                                Some('t') => literal.push('\t'),
                                Some(escaped) => literal.push(escaped),
                                None => return Err("unterminated escape".to_string()),
                            },
                            Some('\'') => break,
                            Some(other) => literal.push(other),
                            None => return Err("unterminated string literal".to_string()),
                        }
                    }
                    tokens.push(Token::Literal(literal));
                }
                c if c.is_alphanumeric() || c == '_' || c == '.' => {
                    let mut word = String::new();
                    while let Some(&c) = chars.peek() {
                        if c.is_alphanumeric() || c == '_' || c == '.' {
                            word.push(c);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    tokens.push(Token::Word(word));
                }
                other => return Err(format!("unexpected character '{}'", other)),
            }
        }
        Ok(tokens)
    }

    struct Parser {
        tokens: Vec<Token>,
        pos: usize,
    }

    impl Parser {
        fn peek(&self) -> Option<&Token> {
            self.tokens.get(self.pos)
        }

        fn next(&mut self) -> Option<Token> {
            let token = self.tokens.get(self.pos).cloned();
            self.pos += 1;
            token
        }

        fn peek_keyword(&self, keyword: &str) -> bool {
            matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
        }

        fn keyword(&mut self, keyword: &str) -> Result<(), String> {
            if self.peek_keyword(keyword) {
                self.pos += 1;
                Ok(())
            } else {
                Err(format!("expected {}", keyword))
            }
        }

        fn word(&mut self) -> Result<String, String> {
            match self.next() {
                Some(Token::Word(w)) => Ok(w),
                other => Err(format!("expected identifier, found {:?}", other)),
            }
        }

        fn or_expr(&mut self) -> Result<Condition, String> {
            let mut left = self.and_expr()?;
            while self.peek_keyword("OR") {
                self.pos += 1;
                let right = self.and_expr()?;
                left = Condition::Or(Box::new(left), Box::new(right));
            }
            Ok(left)
        }

        fn and_expr(&mut self) -> Result<Condition, String> {
            let mut left = self.term()?;
            while self.peek_keyword("AND") {
                self.pos += 1;
                let right = self.term()?;
                left = Condition::And(Box::new(left), Box::new(right));
            }
            Ok(left)
        }

        fn term(&mut self) -> Result<Condition, String> {
            if self.peek() == Some(&Token::Open) {
                self.pos += 1;
                let inner = self.or_expr()?;
                return match self.next() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err("expected ')'".to_string()),
                };
            }
            let field = self.word()?;
            if self.next() != Some(Token::Equals) {
                return Err(format!("expected '=' after {}", field));
            }
            match self.next() {
                Some(Token::Literal(value)) => Ok(Condition::Equals(field, value)),
                other => Err(format!("expected string literal, found {:?}", other)),
            }
        }
    }

    pub(super) fn parse(input: &str) -> Result<Select, String> {
        let mut p = Parser {
            tokens: tokenize(input)?,
            pos: 0,
        };
        p.keyword("SELECT")?;
        let mut fields = vec![p.word()?];
        while p.peek() == Some(&Token::Comma) {
            p.pos += 1;
            fields.push(p.word()?);
        }
        p.keyword("FROM")?;
        let object = p.word()?;
        let filter = if p.peek_keyword("WHERE") {
            p.pos += 1;
            Some(p.or_expr()?)
        } else {
            None
        };
        if let Some(extra) = p.peek() {
            return Err(format!("unexpected trailing token {:?}", extra));
        }
        Ok(Select {
            fields,
            object,
            filter,
        })
    }
}
