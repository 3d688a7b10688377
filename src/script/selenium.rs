use crate::script::script_model::{GeneratedScript, Routine, ScriptStep, Selector};

// ============================================================================
// Selenium (Python unittest) renderer
// ============================================================================

/// Render a script as a self-contained Python `unittest` module driving
/// Chrome through Selenium.
///
/// Shape:
/// ```text
/// class GeneratedUiTests(unittest.TestCase):
///     def setUp(self): ...        # opens the page once per test
///     def tearDown(self): ...     # quits the driver
///     def test_tc_001(self): ...  # one method per routine
/// ```
pub fn render_selenium(script: &GeneratedScript) -> String {
    let mut out = String::new();

    out.push_str("import pathlib\nimport time\nimport unittest\n\n");
    out.push_str("from selenium import webdriver\n");
    out.push_str("from selenium.webdriver.common.by import By\n\n\n");

    out.push_str("class GeneratedUiTests(unittest.TestCase):\n");
    out.push_str("    def setUp(self):\n");
    out.push_str("        options = webdriver.ChromeOptions()\n");
    if script.headless {
        out.push_str("        options.add_argument('--headless=new')\n");
    }
    out.push_str("        self.driver = webdriver.Chrome(options=options)\n");
    for step in &script.setup {
        out.push_str(&render_setup_step(step));
    }
    out.push('\n');

    out.push_str("    def tearDown(self):\n");
    out.push_str("        self.driver.quit()\n");

    for routine in &script.routines {
        out.push('\n');
        out.push_str(&render_routine(routine));
    }

    out.push_str("\n\nif __name__ == '__main__':\n");
    out.push_str("    unittest.main()\n");
    out
}

fn render_setup_step(step: &ScriptStep) -> String {
    match step {
        ScriptStep::Navigate { page_path } => format!(
            "        self.driver.get(pathlib.Path({}).resolve().as_uri())\n",
            py_str(page_path)
        ),
        other => render_step(other),
    }
}

fn render_routine(routine: &Routine) -> String {
    let mut out = format!("    def {}(self):\n", routine.name);
    let mut steps = routine.steps.iter().peekable();

    // Leading log line, then the driver alias, then interactions.
    if matches!(steps.peek(), Some(ScriptStep::Log { .. })) {
        if let Some(step) = steps.next() {
            out.push_str(&render_step(step));
        }
    }
    out.push_str("        driver = self.driver\n\n");

    for step in steps {
        if matches!(step, ScriptStep::Wait { .. }) {
            out.push('\n');
        }
        out.push_str(&render_step(step));
    }

    out
}

fn render_step(step: &ScriptStep) -> String {
    match step {
        ScriptStep::Navigate { page_path } => format!(
            "        driver.get(pathlib.Path({}).resolve().as_uri())\n",
            py_str(page_path)
        ),
        ScriptStep::Log { message } => format!("        print({})\n", py_str(message)),
        ScriptStep::Type { selector, value, .. } => format!(
            "        driver.find_element({}).send_keys({})\n",
            locator(selector),
            py_str(value)
        ),
        ScriptStep::Click { selector, .. } => {
            format!("        driver.find_element({}).click()\n", locator(selector))
        }
        ScriptStep::Unresolved { reference } => format!(
            "        # \u{26a0} Could not resolve element: {}\n",
            single_line(reference)
        ),
        ScriptStep::Comment { text } => format!("        # {}\n", single_line(text)),
        ScriptStep::Wait { seconds } => format!("        time.sleep({})\n", seconds),
        ScriptStep::AssertionPlaceholder { expected } => format!(
            "        # Example assertion:\n        # self.assertIn({}, driver.page_source)\n",
            py_str(&single_line(expected))
        ),
    }
}

fn locator(selector: &Selector) -> String {
    match selector {
        Selector::Id { value } => format!("By.ID, {}", py_str(value)),
        Selector::Name { value } => format!("By.NAME, {}", py_str(value)),
        Selector::Text { .. } => format!("By.XPATH, {}", py_str(&selector.to_xpath())),
    }
}

/// Single-quoted Python string literal.
pub fn py_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
