//! Single-page form
//!
//! Team pickers, a date picker refreshed from `/api/dates` whenever either
//! team changes, and a threshold slider. The result panel renders the
//! markdown explanation as plain preformatted text.

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>NBA home-win predictor</title>
<style>
body { font-family: system-ui, sans-serif; max-width: 42rem; margin: 2rem auto; padding: 0 1rem; }
label { display: block; margin-top: 1rem; font-weight: 600; }
select, input[type=range] { width: 100%; }
#label { font-size: 1.5rem; margin-top: 1.5rem; }
#explanation { white-space: pre-wrap; background: #f5f5f5; padding: 1rem; border-radius: 4px; }
</style>
</head>
<body>
<h1>🏀 NBA home-win predictor</h1>
<p>Pick a historical matchup from the demo dataset.</p>
<form id="matchup">
  <label for="home">Home team</label>
  <select id="home" name="home"></select>
  <label for="away">Away team</label>
  <select id="away" name="away"></select>
  <label for="date">Game date</label>
  <select id="date" name="date"></select>
  <label for="threshold">Decision threshold: <span id="threshold-value">__THRESHOLD__</span></label>
  <input type="range" id="threshold" name="threshold" min="0.5" max="0.9" step="0.01" value="__THRESHOLD__">
  <button type="submit">Predict</button>
</form>
<div id="label"></div>
<p>P(Home win): <output id="probability">n/a</output></p>
<div id="explanation"></div>
<script>
const $ = (id) => document.getElementById(id);

function fill(select, values) {
  select.innerHTML = "";
  for (const v of values) {
    const opt = document.createElement("option");
    opt.value = v;
    opt.textContent = v;
    select.appendChild(opt);
  }
}

function formatProbability(p) {
  return typeof p === "number" ? p.toFixed(4) : "n/a";
}

async function refreshDates() {
  const home = encodeURIComponent($("home").value);
  const away = encodeURIComponent($("away").value);
  const res = await fetch(`/api/dates?home=${home}&away=${away}`);
  const body = await res.json();
  fill($("date"), body.dates);
}

async function init() {
  const res = await fetch("/api/teams");
  const body = await res.json();
  fill($("home"), body.teams);
  fill($("away"), body.teams);
  if (body.teams.length > 1) { $("away").selectedIndex = 1; }
  await refreshDates();
}

$("home").addEventListener("change", refreshDates);
$("away").addEventListener("change", refreshDates);
$("threshold").addEventListener("input", (e) => {
  $("threshold-value").textContent = Number(e.target.value).toFixed(2);
});

$("matchup").addEventListener("submit", async (e) => {
  e.preventDefault();
  const payload = {
    home: $("home").value,
    away: $("away").value,
    date: $("date").value,
    threshold: Number($("threshold").value),
  };
  const res = await fetch("/api/predict", {
    method: "POST",
    headers: { "content-type": "application/json" },
    body: JSON.stringify(payload),
  });
  const body = await res.json();
  $("label").textContent = body.label;
  $("probability").textContent = formatProbability(body.probability);
  $("explanation").textContent = body.explanation.replaceAll("**", "");
});

init();
</script>
</body>
</html>
"#;

/// Page with the slider preset to `threshold`
pub fn render(threshold: f64) -> String {
    TEMPLATE.replace("__THRESHOLD__", &format!("{:.2}", threshold))
}
