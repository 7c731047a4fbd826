use todo_core::TodoList;

/// Render the filtered list and the form state.
pub fn render(list: &TodoList) -> String {
    let mut out = String::new();
    if !list.filter().is_empty() {
        out.push_str(&format!("filter: {:?}\n", list.filter()));
    }

    let visible = list.visible();
    if visible.is_empty() {
        out.push_str("No result. Create a new one instead!\n");
    }
    for (n, todo) in visible.iter().enumerate() {
        let mark = if todo.is_completed { 'x' } else { ' ' };
        out.push_str(&format!("{:>3}. [{mark}] {}\n", n + 1, todo.text));
    }

    if list.editing().is_some() {
        out.push_str(&format!(
            "editing: {:?} (add <text> to save, cancel to leave)\n",
            list.draft()
        ));
    }
    out
}
