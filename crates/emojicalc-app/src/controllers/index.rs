//! Calculator entry page and calculation.

use std::sync::Arc;

use emojicalc_core::number::{format_number, parse_decimal};
use emojicalc_core::{calculate_guarded, CalculationFault, Operator, Operators};
use emojicalc_http::{Placeholders, Request, Response, ViewError, ViewRenderer, JSON_CONTENT_TYPE};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Entry form view.
pub const SHOW_ENTRY_VIEW: &str = "showEntry";

/// View rendered once per registered operator.
pub const OPERATOR_OPTION_VIEW: &str = "operatorOption";

/// Results view.
pub const RESULTS_VIEW: &str = "results";

const MISSING_FIRST: &str = "Missing first number";
const INVALID_FIRST: &str = "First number must be a float (decimal)";
const MISSING_SECOND: &str = "Missing second number";
const INVALID_SECOND: &str = "Second number must be a float (decimal)";
const MISSING_OPERATOR: &str = "Missing operator";
const UNRECOGNISED_OPERATOR: &str = "Unrecognised operator";
const ERROR_SEPARATOR: &str = "<br>";

/// Marks the operator option matching the current selection.
const SELECTED: &str = "selected='selected'";

/// Placeholder values before rendering.
///
/// Operands stay numeric so JSON replies carry them as numbers; everything
/// else is a string.
type Fields = IndexMap<String, Value>;

/// Outcome of reading one operand from the request body.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Operand {
    Missing,
    Invalid,
    Valid(f64),
}

impl Operand {
    fn read(body: &Map<String, Value>, key: &str) -> Self {
        match body.get(key) {
            None => Self::Missing,
            Some(Value::Number(number)) => number.as_f64().map_or(Self::Invalid, Self::Valid),
            Some(Value::String(text)) => parse_decimal(text).map_or(Self::Invalid, Self::Valid),
            Some(_) => Self::Invalid,
        }
    }
}

/// The calculator controller.
///
/// Serves the entry form and performs calculations posted back to it, as
/// HTML or, for JSON requests, as a flat JSON object of the same values.
#[derive(Debug, Clone)]
pub struct IndexController {
    operators: Arc<Operators>,
    renderer: Arc<ViewRenderer>,
}

impl IndexController {
    /// Creates a controller over a registry and a renderer.
    #[must_use]
    pub fn new(operators: Arc<Operators>, renderer: Arc<ViewRenderer>) -> Self {
        Self {
            operators,
            renderer,
        }
    }

    /// Renders the empty entry form.
    pub fn start(&self, request: &Request, response: Response) -> Result<Response, ViewError> {
        self.show_entry_page(request, response, Fields::new())
    }

    /// Validates the posted fields and performs the calculation.
    ///
    /// Validation problems and calculation faults are reported on the entry
    /// form rather than as errors. Only a missing view fails the call.
    pub fn calculate(&self, request: &Request, mut response: Response) -> Result<Response, ViewError> {
        let body = request.parsed_body();
        let mut fields = Fields::new();
        let mut errors: Vec<String> = Vec::new();

        let first = match Operand::read(body, "first") {
            Operand::Missing => {
                errors.push(MISSING_FIRST.to_string());
                None
            }
            Operand::Invalid => {
                errors.push(INVALID_FIRST.to_string());
                None
            }
            Operand::Valid(value) => {
                fields.insert("%FIRST%".to_string(), Value::from(value));
                Some(value)
            }
        };

        let second = match Operand::read(body, "second") {
            Operand::Missing => {
                errors.push(MISSING_SECOND.to_string());
                None
            }
            Operand::Invalid => {
                errors.push(INVALID_SECOND.to_string());
                None
            }
            Operand::Valid(value) => {
                fields.insert("%SECOND%".to_string(), Value::from(value));
                Some(value)
            }
        };

        let operator = match body.get("operator") {
            None => {
                errors.push(MISSING_OPERATOR.to_string());
                None
            }
            Some(value) => {
                let found = value
                    .as_str()
                    .and_then(|code| self.operators.find_by_symbol(code).ok());
                match found {
                    Some(operator) => {
                        insert_text(&mut fields, "%OPERATOR%", operator.symbol().code());
                        insert_text(&mut fields, "%OPERATORNAME%", operator.name());
                        insert_text(&mut fields, "%SYMBOLNAME%", operator.symbol().name());
                        Some(Arc::clone(operator))
                    }
                    None => {
                        errors.push(UNRECOGNISED_OPERATOR.to_string());
                        None
                    }
                }
            }
        };

        let (Some(first), Some(second), Some(operator)) = (first, second, operator) else {
            tracing::debug!(errors = errors.len(), "Calculation input rejected");
            return self.show_errors(request, response, fields, &errors);
        };

        match calculate_guarded(operator.as_ref(), first, second) {
            Ok(result) => {
                insert_text(&mut fields, "%RESULT%", &format_number(result));
            }
            Err(fault) => {
                tracing::debug!(
                    operator_type = operator.operator_type(),
                    error = %fault,
                    "Calculation failed"
                );
                errors.push(fault_message(&fault));
                return self.show_errors(request, response, fields, &errors);
            }
        }

        if request.is_json() {
            response.reset(JSON_CONTENT_TYPE);
            insert_text(&mut fields, "%SHOWENTRY%", "");
            let html_results = self.renderer.render(RESULTS_VIEW, &to_placeholders(&fields))?;
            insert_text(&mut fields, "htmlResults", &html_results);
            response.add_to_body(to_json(fields));
        } else {
            let show_entry = self.render_show_entry(fields.clone())?;
            insert_text(&mut fields, "%SHOWENTRY%", &show_entry);
            let rendered = self.renderer.render(RESULTS_VIEW, &to_placeholders(&fields))?;
            response.add_to_body(rendered);
        }

        Ok(response)
    }

    fn show_errors(
        &self,
        request: &Request,
        response: Response,
        mut fields: Fields,
        errors: &[String],
    ) -> Result<Response, ViewError> {
        insert_text(&mut fields, "%ERRORS%", &errors.join(ERROR_SEPARATOR));
        self.show_entry_page(request, response, fields)
    }

    /// Writes the entry page as HTML, or as JSON into a fresh response.
    fn show_entry_page(
        &self,
        request: &Request,
        mut response: Response,
        fields: Fields,
    ) -> Result<Response, ViewError> {
        if request.is_json() {
            let fields = self.show_entry_fields(fields)?;
            let mut response = Response::json();
            response.add_to_body(to_json(fields));
            Ok(response)
        } else {
            response.add_to_body(self.render_show_entry(fields)?);
            Ok(response)
        }
    }

    fn render_show_entry(&self, fields: Fields) -> Result<String, ViewError> {
        let fields = self.show_entry_fields(fields)?;
        self.renderer.render(SHOW_ENTRY_VIEW, &to_placeholders(&fields))
    }

    /// Fills in the entry form defaults and the rendered operator options.
    fn show_entry_fields(&self, fields: Fields) -> Result<Fields, ViewError> {
        let mut merged = Fields::new();
        for key in ["%ERRORS%", "%FIRST%", "%SECOND%", "%OPERATOR%"] {
            insert_text(&mut merged, key, "");
        }
        merged.extend(fields);

        let selected = merged.get("%OPERATOR%").and_then(Value::as_str);
        let mut options = String::new();
        for operator in self.operators.iter() {
            options.push_str(&self.render_option(operator.as_ref(), selected)?);
        }
        insert_text(&mut merged, "%OPERATORS%", &options);

        Ok(merged)
    }

    fn render_option(&self, operator: &dyn Operator, selected: Option<&str>) -> Result<String, ViewError> {
        let code = operator.symbol().code();
        let mut placeholders = Placeholders::new();
        placeholders.insert("%OPERATORTYPE%".to_string(), operator.operator_type().to_string());
        placeholders.insert("%SYMBOL%".to_string(), code.to_string());
        placeholders.insert(
            "%SELECTED%".to_string(),
            if selected == Some(code) { SELECTED } else { "" }.to_string(),
        );
        self.renderer.render(OPERATOR_OPTION_VIEW, &placeholders)
    }
}

fn insert_text(fields: &mut Fields, key: &str, value: &str) {
    fields.insert(key.to_string(), Value::String(value.to_string()));
}

fn fault_message(fault: &CalculationFault) -> String {
    match fault {
        CalculationFault::Arithmetic(message) => {
            format!("Unable to calculate - arithmetic error: {message}")
        }
        CalculationFault::UnrecognisedOperator(_) => "Unable to calculate - invalid operator".to_string(),
    }
}

/// Converts fields to template text. Numbers use display formatting.
fn to_placeholders(fields: &Fields) -> Placeholders {
    fields
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(text) => text.clone(),
                Value::Number(number) => number.as_f64().map_or_else(|| number.to_string(), format_number),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}

/// Serialises fields with `%` stripped from keys and keys lower-cased.
fn to_json(fields: Fields) -> String {
    let object: Map<String, Value> = fields
        .into_iter()
        .map(|(key, value)| (key.replace('%', "").to_lowercase(), value))
        .collect();
    Value::Object(object).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use emojicalc_core::default_operators;
    use emojicalc_http::{Environment, MemorySource};
    use proptest::prelude::*;

    const SUBTRACTION: &str = "\u{1f480}";
    const DIVISION: &str = "\u{1f631}";

    fn controller() -> IndexController {
        let views = MemorySource::new()
            .with_template(SHOW_ENTRY_VIEW, "[%ERRORS%|%FIRST%|%SECOND%|%OPERATOR%]{%OPERATORS%}")
            .with_template(OPERATOR_OPTION_VIEW, "<%OPERATORTYPE%%SYMBOL%%SELECTED%>")
            .with_template(RESULTS_VIEW, "%SHOWENTRY%=%FIRST% %OPERATORNAME% %SECOND% is %RESULT%");
        IndexController::new(
            Arc::new(default_operators()),
            Arc::new(ViewRenderer::new(views)),
        )
    }

    fn form(fields: &[(&str, &str)]) -> Request {
        let env = fields.iter().fold(
            Environment::new().with_method("POST").with_uri("/"),
            |env, (key, value)| env.with_form_field(*key, *value),
        );
        Request::new(env)
    }

    fn json(body: &str) -> Request {
        Request::new(
            Environment::new()
                .with_method("POST")
                .with_uri("/")
                .with_content_type("application/json")
                .with_input(body.to_string()),
        )
    }

    fn parse(response: &Response) -> Map<String, Value> {
        match serde_json::from_str(response.body()).unwrap() {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn test_start_lists_operators_in_order() {
        let response = controller()
            .start(&Request::new(Environment::new()), Response::default())
            .unwrap();
        assert_eq!(
            response.body(),
            "[|||]{<+\u{1f47d}><-\u{1f480}><*\u{1f47b}></\u{1f631}>}"
        );
        assert!(response.is_html());
    }

    #[test]
    fn test_start_json() {
        let response = controller()
            .start(&json("{}"), Response::default())
            .unwrap();
        assert_eq!(response.content_type(), JSON_CONTENT_TYPE);

        let body = parse(&response);
        let keys: Vec<&str> = body.keys().map(String::as_str).collect();
        assert_eq!(keys, ["errors", "first", "second", "operator", "operators"]);
        assert_eq!(body["errors"], "");
    }

    #[test]
    fn test_calculate_html() {
        let request = form(&[("first", "102.43"), ("second", "43.32"), ("operator", SUBTRACTION)]);
        let response = controller().calculate(&request, Response::default()).unwrap();
        assert_eq!(
            response.body(),
            "[|102.43|43.32|\u{1f480}]{<+\u{1f47d}><-\u{1f480}selected='selected'><*\u{1f47b}></\u{1f631}>}\
             =102.43 subtraction 43.32 is 59.11"
        );
    }

    #[test]
    fn test_calculate_missing_everything() {
        let response = controller().calculate(&form(&[]), Response::default()).unwrap();
        assert!(response
            .body()
            .starts_with("[Missing first number<br>Missing second number<br>Missing operator|||]"));
    }

    #[test]
    fn test_calculate_invalid_values() {
        let request = form(&[("first", "ten"), ("second", "1,5"), ("operator", "?")]);
        let response = controller().calculate(&request, Response::default()).unwrap();
        assert!(response.body().starts_with(
            "[First number must be a float (decimal)<br>Second number must be a float (decimal)<br>Unrecognised operator|||]"
        ));
    }

    #[test]
    fn test_calculate_keeps_valid_fields_on_error() {
        let request = form(&[("first", "7"), ("operator", DIVISION)]);
        let response = controller().calculate(&request, Response::default()).unwrap();
        assert!(response.body().starts_with("[Missing second number|7||\u{1f631}]"));
        assert!(response.body().contains("</\u{1f631}selected='selected'>"));
    }

    #[test]
    fn test_calculate_divide_by_zero() {
        let request = form(&[("first", "100"), ("second", "0"), ("operator", DIVISION)]);
        let response = controller().calculate(&request, Response::default()).unwrap();
        assert!(response.body().starts_with(
            "[Unable to calculate - arithmetic error: Cannot divide by zero|100|0|\u{1f631}]"
        ));
    }

    #[test]
    fn test_calculate_json() {
        let request = json(&format!(
            r#"{{"first": 102.43, "second": "43.32", "operator": "{SUBTRACTION}"}}"#
        ));
        let response = controller().calculate(&request, Response::default()).unwrap();
        assert_eq!(response.content_type(), JSON_CONTENT_TYPE);

        let body = parse(&response);
        let keys: Vec<&str> = body.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "first",
                "second",
                "operator",
                "operatorname",
                "symbolname",
                "result",
                "showentry",
                "htmlresults"
            ]
        );
        assert_eq!(body["first"], 102.43);
        assert_eq!(body["second"], 43.32);
        assert_eq!(body["operator"], SUBTRACTION);
        assert_eq!(body["operatorname"], "subtraction");
        assert_eq!(body["symbolname"], "Skull");
        assert_eq!(body["result"], "59.11");
        assert_eq!(body["showentry"], "");
        assert_eq!(body["htmlresults"], "=102.43 subtraction 43.32 is 59.11");
    }

    #[test]
    fn test_calculate_json_errors() {
        let request = json(r#"{"first": null, "second": 2}"#);
        let response = controller().calculate(&request, Response::default()).unwrap();
        assert_eq!(response.content_type(), JSON_CONTENT_TYPE);

        let body = parse(&response);
        assert_eq!(
            body["errors"],
            "First number must be a float (decimal)<br>Missing operator"
        );
        assert_eq!(body["first"], "");
        assert_eq!(body["second"], 2.0);
    }

    #[test]
    fn test_calculate_missing_view_fails() {
        let controller = IndexController::new(
            Arc::new(default_operators()),
            Arc::new(ViewRenderer::new(MemorySource::new())),
        );
        let err = controller.calculate(&form(&[]), Response::default()).unwrap_err();
        assert!(matches!(err, ViewError::NotFound { .. }));
    }

    #[test]
    fn test_fault_messages() {
        assert_eq!(
            fault_message(&CalculationFault::arithmetic("Bad sum")),
            "Unable to calculate - arithmetic error: Bad sum"
        );
        assert_eq!(
            fault_message(&CalculationFault::UnrecognisedOperator("x".into())),
            "Unable to calculate - invalid operator"
        );
    }

    #[test]
    fn test_operand_read() {
        let body: Map<String, Value> =
            serde_json::from_str(r#"{"a": "1.5", "b": 2, "c": true, "d": " 3 "}"#).unwrap();
        assert_eq!(Operand::read(&body, "a"), Operand::Valid(1.5));
        assert_eq!(Operand::read(&body, "b"), Operand::Valid(2.0));
        assert_eq!(Operand::read(&body, "c"), Operand::Invalid);
        assert_eq!(Operand::read(&body, "d"), Operand::Valid(3.0));
        assert_eq!(Operand::read(&body, "e"), Operand::Missing);
    }

    proptest! {
        #[test]
        fn test_integer_subtraction_renders_exactly(a in -10_000i32..10_000, b in -10_000i32..10_000) {
            let first = a.to_string();
            let second = b.to_string();
            let request = form(&[("first", first.as_str()), ("second", second.as_str()), ("operator", SUBTRACTION)]);

            let response = controller().calculate(&request, Response::default()).unwrap();
            let expected = format!(" is {}", a - b);
            prop_assert!(response.body().ends_with(&expected), "{}", response.body());
        }
    }
}
