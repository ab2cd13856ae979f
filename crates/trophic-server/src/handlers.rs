//! REST API endpoint handlers for the Trophic server.
//!
//! All handlers delegate to the [`GridStore`] held in the shared
//! [`AppState`]; they contain no simulation logic of their own.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Embedded HTML dashboard |
//! | `GET` | `/api/simulation` | Current grid snapshot |
//! | `POST` | `/api/simulation` | Reset and seed the grid |
//! | `POST` | `/api/simulation/step` | Advance exactly one tick |
//!
//! [`GridStore`]: trophic_core::store::GridStore

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use trophic_types::{GridSnapshot, PopulationCounts};

use crate::error::ApiError;
use crate::state::AppState;

/// The dashboard page: a population form, seed/step controls, and a live
/// grid rendering fed by the JSON API.
const DASHBOARD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Trophic</title>
    <style>
        body {
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 900px;
            margin: 0 auto;
        }
        h1 { color: #58a6ff; margin-bottom: 0.25rem; }
        .subtitle { color: #8b949e; margin-top: 0; }
        .controls {
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 1rem 0;
        }
        .controls label { margin-right: 0.5rem; color: #8b949e; }
        .controls input {
            width: 4rem;
            background: #0d1117;
            color: #c9d1d9;
            border: 1px solid #30363d;
            border-radius: 4px;
            padding: 0.25rem 0.5rem;
            margin-right: 1rem;
        }
        button {
            background: #238636;
            color: #ffffff;
            border: none;
            border-radius: 6px;
            padding: 0.4rem 1rem;
            margin-right: 0.5rem;
            cursor: pointer;
            font-family: inherit;
        }
        button.step { background: #1f6feb; }
        button:disabled { background: #30363d; cursor: default; }
        .metric {
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 0.5rem 1rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 90px;
        }
        .metric .label { color: #8b949e; font-size: 0.8rem; }
        .metric .value { color: #58a6ff; font-size: 1.2rem; font-weight: bold; }
        #grid { border-collapse: collapse; margin-top: 1rem; }
        #grid td {
            width: 2rem;
            height: 2rem;
            border: 1px solid #30363d;
            text-align: center;
            font-weight: bold;
        }
        td.P { background: #1b4721; color: #7ee787; }
        td.H { background: #11304d; color: #79c0ff; }
        td.C { background: #4d1414; color: #ff7b72; }
        #error { color: #ff7b72; min-height: 1.2rem; }
    </style>
</head>
<body>
    <h1>Trophic</h1>
    <p class="subtitle">Predator-prey grid simulation</p>

    <div class="controls">
        <label for="plants">Plants</label>
        <input id="plants" type="number" min="0" value="40">
        <label for="herbivores">Herbivores</label>
        <input id="herbivores" type="number" min="0" value="30">
        <label for="carnivores">Carnivores</label>
        <input id="carnivores" type="number" min="0" value="10">
        <button id="seed">Seed</button>
        <button id="step" class="step">Step</button>
    </div>

    <div>
        <span class="metric"><div class="label">Tick</div><div class="value" id="tick">0</div></span>
        <span class="metric"><div class="label">Plants</div><div class="value" id="count-p">0</div></span>
        <span class="metric"><div class="label">Herbivores</div><div class="value" id="count-h">0</div></span>
        <span class="metric"><div class="label">Carnivores</div><div class="value" id="count-c">0</div></span>
    </div>
    <p id="error"></p>

    <table id="grid"></table>

    <script>
        const errorLine = document.getElementById('error');

        function render(snapshot) {
            document.getElementById('tick').textContent = snapshot.tick;
            const counts = { P: 0, H: 0, C: 0 };
            const table = document.getElementById('grid');
            table.innerHTML = '';
            for (const row of snapshot.cells) {
                const tr = document.createElement('tr');
                for (const cell of row) {
                    const td = document.createElement('td');
                    if (cell.kind !== ' ') {
                        td.className = cell.kind;
                        td.textContent = cell.kind;
                        td.title = 'energy ' + cell.energy + ', age ' + cell.age;
                        counts[cell.kind] += 1;
                    }
                    tr.appendChild(td);
                }
                table.appendChild(tr);
            }
            document.getElementById('count-p').textContent = counts.P;
            document.getElementById('count-h').textContent = counts.H;
            document.getElementById('count-c').textContent = counts.C;
        }

        async function call(path, options) {
            errorLine.textContent = '';
            const response = await fetch(path, options);
            const body = await response.json();
            if (!response.ok) {
                errorLine.textContent = body.error;
                return;
            }
            render(body);
        }

        document.getElementById('seed').addEventListener('click', () => call('/api/simulation', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({
                plants: Number(document.getElementById('plants').value),
                herbivores: Number(document.getElementById('herbivores').value),
                carnivores: Number(document.getElementById('carnivores').value),
            }),
        }));
        document.getElementById('step').addEventListener('click',
            () => call('/api/simulation/step', { method: 'POST' }));

        call('/api/simulation', { method: 'GET' });
    </script>
</body>
</html>
"#;

/// Serve the embedded HTML dashboard.
pub async fn index() -> impl IntoResponse {
    Html(DASHBOARD)
}

/// `GET /api/simulation` -- the current grid snapshot, without advancing.
pub async fn get_simulation(State(state): State<Arc<AppState>>) -> Json<GridSnapshot> {
    Json(state.store.snapshot().await)
}

/// `POST /api/simulation` -- reset the grid and place the requested
/// populations.
///
/// # Errors
///
/// Returns [`ApiError::InvalidPopulation`] (HTTP 400) if the requested
/// total exceeds grid capacity; the prior grid is left untouched.
pub async fn seed_simulation(
    State(state): State<Arc<AppState>>,
    Json(counts): Json<PopulationCounts>,
) -> Result<Json<GridSnapshot>, ApiError> {
    let snapshot = state.store.seed(counts).await?;
    Ok(Json(snapshot))
}

/// `POST /api/simulation/step` -- advance the simulation by exactly one
/// tick and return the new grid. Never fails.
pub async fn step_simulation(State(state): State<Arc<AppState>>) -> Json<GridSnapshot> {
    Json(state.store.step().await)
}
