//! The single HTML page served at `/`.

use minijinja::{context, Environment, UndefinedBehavior};

use crate::analyzer::{Sentiment, SentimentResult};

/// Texts offered as one-click examples under the input box
pub const EXAMPLES: &[&str] = &[
    "Merhaba, bugün harika bir gün! Çok mutluyum.",
    "Bu çok kötü bir deneyimdi. Hiç beğenmedim.",
    "Bugün hava normal, ne iyi ne kötü.",
    "I love this app! It's amazing!",
    "This is terrible, I hate it.",
    "The weather is okay today.",
];

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter some text";

pub fn sentiment_display(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "😊 Positive",
        Sentiment::Negative => "😞 Negative",
        Sentiment::Neutral => "😐 Neutral",
    }
}

pub fn confidence_display(result: &SentimentResult) -> String {
    format!("{:.1}%", result.confidence * 100.0)
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Chat Sentiment Analysis API</title>
<style>
  body { font-family: system-ui, sans-serif; background: #f6f7fb; color: #1f2937; }
  .container { max-width: 800px; margin: auto; padding: 1.5rem; }
  .row { display: flex; gap: 1.5rem; flex-wrap: wrap; }
  .column { flex: 1 1 320px; display: flex; flex-direction: column; gap: 0.5rem; }
  textarea, input { font: inherit; padding: 0.6rem; border: 1px solid #cbd5e1; border-radius: 8px; background: #fff; }
  button.primary { font: inherit; font-size: 1.1rem; padding: 0.7rem; border: 0; border-radius: 8px; background: #6366f1; color: #fff; cursor: pointer; }
  button.example { font: inherit; text-align: left; padding: 0.4rem 0.6rem; border: 1px solid #cbd5e1; border-radius: 6px; background: #fff; cursor: pointer; }
  .examples { display: flex; flex-wrap: wrap; gap: 0.5rem; }
  pre { background: #eef2ff; padding: 0.8rem; border-radius: 8px; overflow-x: auto; }
</style>
</head>
<body>
<div class="container">
<h1>🤖 Chat Sentiment Analysis API</h1>
<p>Classifies text as <strong>positive</strong>, <strong>negative</strong> or <strong>neutral</strong>. Turkish, English and many other languages are supported.</p>
<h2>🚀 Usage</h2>
<ul>
  <li>Type the text you want to analyse into the box</li>
  <li>Click "Analyze" or press Enter</li>
  <li>The result appears on the right</li>
</ul>
<div class="row">
  <div class="column">
    <label for="text">📝 Text</label>
    <textarea id="text" rows="3" placeholder="Type the text to analyse here..."></textarea>
    <button id="analyze" class="primary">🔍 Analyze</button>
  </div>
  <div class="column">
    <label for="sentiment">🎯 Sentiment</label>
    <textarea id="sentiment" rows="2" readonly></textarea>
    <label for="confidence">📊 Confidence</label>
    <input id="confidence" readonly>
  </div>
</div>
<h3>💡 Examples</h3>
<div class="examples">
{%- for example in examples %}
  <button class="example" data-text="{{ example }}">{{ example }}</button>
{%- endfor %}
</div>
<h2>🔧 API Usage</h2>
<pre>curl -X POST "http://localhost:7860/api/predict" \
     -H "Content-Type: application/json" \
     -d '{"text": "Merhaba dünya!"}'

# {"sentiment": "positive", "data": ["positive"]}</pre>
<p><code>POST /api/analyze</code> takes the same body and also returns the confidence score and the model's original label.</p>
</div>
<script>
  const text = document.getElementById("text");
  const sentiment = document.getElementById("sentiment");
  const confidence = document.getElementById("confidence");

  async function analyze() {
    try {
      const response = await fetch("/api/analyze", {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify({ text: text.value }),
      });
      const body = await response.json();
      sentiment.value = body.sentiment_display;
      confidence.value = body.confidence_display;
    } catch (err) {
      sentiment.value = "Error: " + err;
      confidence.value = "";
    }
  }

  document.getElementById("analyze").addEventListener("click", analyze);
  text.addEventListener("keydown", (event) => {
    if (event.key === "Enter" && !event.shiftKey) {
      event.preventDefault();
      analyze();
    }
  });
  document.querySelectorAll("button.example").forEach((button) => {
    button.addEventListener("click", () => { text.value = button.dataset.text; });
  });
</script>
</body>
</html>
"#;

/// Renders the full page
pub fn render_page() -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    // Name ends in .html, so values are HTML-escaped on output
    env.add_template("index.html", PAGE_TEMPLATE)?;
    env.get_template("index.html")?
        .render(context! { examples => EXAMPLES })
}
