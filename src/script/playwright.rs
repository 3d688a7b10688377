use crate::script::script_model::{GeneratedScript, Routine, ScriptStep, Selector};

// ============================================================================
// Playwright Test (JavaScript) renderer
// ============================================================================

/// Render a script as a Playwright Test spec file. Setup and teardown become
/// `beforeEach`/`afterEach` hooks; each routine becomes one `test(...)`.
pub fn render_playwright(script: &GeneratedScript) -> String {
    let mut out = String::new();

    out.push_str("const { test, expect } = require('@playwright/test');\n");
    out.push_str("const path = require('path');\n");
    out.push_str("const { pathToFileURL } = require('url');\n\n");
    out.push_str(&format!("test.use({{ headless: {} }});\n\n", script.headless));

    out.push_str("test.beforeEach(async ({ page }) => {\n");
    for step in &script.setup {
        out.push_str(&render_step(step));
    }
    out.push_str("});\n\n");

    out.push_str("test.afterEach(async ({ page }) => {\n");
    out.push_str("  await page.close();\n");
    out.push_str("});\n");

    for routine in &script.routines {
        out.push('\n');
        out.push_str(&render_routine(routine));
    }

    out
}

fn render_routine(routine: &Routine) -> String {
    let label = format!("{}: {}", routine.test_id, routine.title);
    let mut out = format!("test({}, async ({{ page }}) => {{\n", js_str(&label));
    for step in &routine.steps {
        out.push_str(&render_step(step));
    }
    out.push_str("});\n");
    out
}

fn render_step(step: &ScriptStep) -> String {
    match step {
        ScriptStep::Navigate { page_path } => format!(
            "  await page.goto(pathToFileURL(path.resolve({})).href);\n",
            js_str(page_path)
        ),
        ScriptStep::Log { message } => format!("  console.log({});\n", js_str(message)),
        ScriptStep::Type { selector, value, .. } => format!(
            "  await page.locator({}).fill({});\n",
            js_str(&css_or_xpath(selector)),
            js_str(value)
        ),
        ScriptStep::Click { selector, .. } => format!(
            "  await page.locator({}).click();\n",
            js_str(&css_or_xpath(selector))
        ),
        ScriptStep::Unresolved { reference } => format!(
            "  // \u{26a0} Could not resolve element: {}\n",
            single_line(reference)
        ),
        ScriptStep::Comment { text } => format!("  // {}\n", single_line(text)),
        ScriptStep::Wait { seconds } => {
            format!("  await page.waitForTimeout({});\n", seconds.saturating_mul(1000))
        }
        ScriptStep::AssertionPlaceholder { expected } => format!(
            "  // Example assertion:\n  // await expect(page.locator('body')).toContainText({});\n",
            js_str(&single_line(expected))
        ),
    }
}

/// Attribute selectors for id/name; XPath for text matches.
fn css_or_xpath(selector: &Selector) -> String {
    match selector {
        Selector::Id { value } => format!("[id=\"{}\"]", css_escape(value)),
        Selector::Name { value } => format!("[name=\"{}\"]", css_escape(value)),
        Selector::Text { .. } => format!("xpath={}", selector.to_xpath()),
    }
}

fn css_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Single-quoted JavaScript string literal.
pub fn js_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
