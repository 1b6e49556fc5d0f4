use console::style;
use smith::tasks::TaskTemplate;
use strum::IntoEnumIterator;

pub fn handle_templates() {
    for template in TaskTemplate::iter() {
        let name: &'static str = template.into();
        println!(
            "{:<24} {}",
            style(name).bold(),
            style(template.slots().join(", ")).dim()
        );
    }
}
