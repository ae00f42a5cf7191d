//! File tree listing every exported page, shown in the sidebar.

use std::collections::BTreeMap;

use crate::core::Location;

pub const FILE_NAME: &str = "file-tree.html";

#[derive(Default)]
struct Folder {
    folders: BTreeMap<String, Folder>,
    /// (title, href)
    pages: Vec<(String, String)>,
}

/// Nested `<ul>` of the pages at `outputs`, folders first, both sorted.
pub fn render(outputs: &[Location]) -> String {
    let mut root = Folder::default();
    for output in outputs {
        let pathname = output.pathname();
        let mut dirs: Vec<&str> = pathname.split('/').collect();
        dirs.pop();
        let folder = dirs.into_iter().fold(&mut root, |folder, dir| {
            folder.folders.entry(dir.to_string()).or_default()
        });
        folder.pages.push((output.stem().to_string(), output.path()));
    }

    let mut html = String::from("<ul class=\"file-tree\">");
    write_folder(&mut html, &mut root);
    html.push_str("</ul>");
    html
}

fn write_folder(html: &mut String, folder: &mut Folder) {
    for (name, child) in &mut folder.folders {
        html.push_str(&format!(
            "<li class=\"tree-folder\"><span>{name}</span><ul>"
        ));
        write_folder(html, child);
        html.push_str("</ul></li>");
    }
    folder.pages.sort();
    for (title, href) in &folder.pages {
        html.push_str(&format!(
            "<li class=\"tree-file\"><a href=\"{href}\">{title}</a></li>"
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nested() {
        let outputs = [
            Location::new("zeta.html"),
            Location::new("notes/b.html"),
            Location::new("alpha.html"),
            Location::new("notes/a.html"),
        ];
        assert_eq!(
            render(&outputs),
            "<ul class=\"file-tree\">\
             <li class=\"tree-folder\"><span>notes</span><ul>\
             <li class=\"tree-file\"><a href=\"notes/a.html\">a</a></li>\
             <li class=\"tree-file\"><a href=\"notes/b.html\">b</a></li>\
             </ul></li>\
             <li class=\"tree-file\"><a href=\"alpha.html\">alpha</a></li>\
             <li class=\"tree-file\"><a href=\"zeta.html\">zeta</a></li>\
             </ul>"
        );
    }
}
