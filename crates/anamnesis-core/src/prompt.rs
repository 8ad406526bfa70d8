//! Prompt templates and rendering.

/// The placeholder a template uses for the note text.
pub const INPUT_PLACEHOLDER: &str = "{INPUT}";

/// Built-in template used whenever a prompt version is unavailable.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Você é uma IA de Psicanálise. \
Analise o texto abaixo e retorne APENAS um JSON válido.\n\
Texto: {INPUT}\n";

/// True if `template` can be rendered, i.e. contains the input placeholder.
pub fn is_renderable(template: &str) -> bool {
    template.contains(INPUT_PLACEHOLDER)
}

/// Substitute the note text into `template`.
pub fn render_prompt(template: &str, input_text: &str) -> String {
    template.replace(INPUT_PLACEHOLDER, input_text)
}
