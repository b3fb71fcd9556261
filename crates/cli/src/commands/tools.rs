//! `rednote tools`: list the agent's tools.

pub fn run(schema: bool) -> Result<(), Box<dyn std::error::Error>> {
    let registry = rednote_tools::default_registry();

    println!("🧰 {} tools available", registry.len());
    println!();
    for def in registry.definitions() {
        println!("  {}", def.name);
        println!("    {}", def.description);
        if schema {
            for line in serde_json::to_string_pretty(&def.parameters)?.lines() {
                println!("    {line}");
            }
        }
        println!();
    }
    Ok(())
}
