//! Static page shells. Charts are rendered browser-side by Plotly against
//! the JSON the API serves; these templates only carry layout and the 10 s
//! refresh loop.

pub const INICIO: &str = include_str!("../templates/inicio.html");
pub const SENSORES: &str = include_str!("../templates/sensores.html");
pub const INFORMACION: &str = include_str!("../templates/informacion.html");
