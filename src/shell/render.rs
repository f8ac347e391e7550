/*!
 * Output Rendering
 */

use crate::process::types::DProc;

pub const HELP: &str = "\
Built-in commands:
  cat <file>          print a local file
  cd [dir|-]          change the local working directory
  contexts            list available cluster contexts
  curl <url>          curl a URL from inside the cluster
  echo <value|$VAR>   print a value or an environment variable
  env                 list variables of the selected environment
  env list            list environments
  env create <name>   create an environment
  env select <name>   select an environment
  env delete <name>   delete an environment
  NAME=value          set a variable in the selected environment
  exit                leave the shell
  help                show this help
  kill <id>           stop a distributed process
  literally <args>    pass arguments straight to kubectl
  ls [args]           list a local directory
  ps [all]            list distributed processes (in all contexts with `all`)
  pwd                 print the local working directory
  sleep <secs>        pause, useful in scripts
  use <context>       switch the cluster context

Anything else launches a distributed process:
  <binary> [args] [&]
  <python|node|ruby> <script> [args] [&]
A trailing & keeps the process running and tracks it.";

/// Column-aligned process listing; `with_context` adds a CONTEXT column
pub fn render_dprocs(entries: &[DProc], with_context: bool) -> String {
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(entries.len() + 1);
    let mut header = vec!["DPID", "KIND", "SOURCE"];
    if with_context {
        header.insert(0, "CONTEXT");
    }
    rows.push(header.into_iter().map(String::from).collect());

    for dproc in entries {
        let mut row = vec![
            dproc.id.clone(),
            dproc.kind.to_string(),
            dproc.source.to_string(),
        ];
        if with_context {
            row.insert(0, dproc.context.clone());
        }
        rows.push(row);
    }

    let columns = rows[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|c| rows.iter().map(|r| r[c].len()).max().unwrap_or(0))
        .collect();

    rows.iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(c, cell)| format!("{:<width$}", cell, width = widths[c]))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
