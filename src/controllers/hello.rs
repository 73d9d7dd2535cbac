//! Greeting controller

use crate::controller::{Args, ControllerDescriptor, HandlerResult, ParamType};

pub fn routes() -> Vec<ControllerDescriptor> {
    vec![ControllerDescriptor::get("/hello", "HelloController.greeting", greeting)
        .query("name", "World", ParamType::Str)]
}

/// `GET /hello?name=...`
pub fn greeting(args: &mut Args<'_>) -> HandlerResult {
    let name = args.str(0)?;
    Ok(Some(format!("Hola, {name}")))
}
