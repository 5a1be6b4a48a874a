//! Page templates and static assets written into each project.
//!
//! `{{ instance_name }}` is filled in at generation time. `{{ error }}` is
//! left in the login page for the server to fill per request.

pub const CHAT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ instance_name }}</title>
  <link rel="stylesheet" href="/static/style.css">
</head>
<body>
  <main class="chat">
    <header>
      <h1>{{ instance_name }}</h1>
      <form method="post" action="/logout"><button type="submit" class="link">Log out</button></form>
    </header>
    <div id="transcript" class="transcript" aria-live="polite"></div>
    <form id="chat-form" class="composer">
      <input id="message" name="message" type="text" autocomplete="off" placeholder="Type a message..." autofocus>
      <button type="submit">Send</button>
    </form>
  </main>
  <script src="/static/app.js"></script>
</body>
</html>
"#;

pub const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ instance_name }} - Login</title>
  <link rel="stylesheet" href="/static/style.css">
</head>
<body>
  <main class="login">
    <h1>{{ instance_name }}</h1>
    <p class="error">{{ error }}</p>
    <form method="post" action="/login">
      <input name="password" type="password" placeholder="Password" autofocus>
      <button type="submit">Enter</button>
    </form>
  </main>
</body>
</html>
"#;

pub const STYLE_CSS: &str = r#"* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, sans-serif; background: #f4f4f6; color: #222; }
main { max-width: 720px; margin: 0 auto; padding: 1rem; }
header { display: flex; justify-content: space-between; align-items: center; }
h1 { font-size: 1.4rem; }
.chat { display: flex; flex-direction: column; height: 100vh; }
.transcript { flex: 1; overflow-y: auto; background: #fff; border-radius: 8px; padding: 1rem; }
.msg { margin: 0.4rem 0; padding: 0.5rem 0.75rem; border-radius: 6px; white-space: pre-wrap; }
.msg.user { background: #dbeafe; margin-left: 20%; }
.msg.bot { background: #eceff3; margin-right: 20%; }
.msg.error { background: #fde2e2; color: #8a1c1c; }
.composer, .login form { display: flex; gap: 0.5rem; margin-top: 0.75rem; }
input { flex: 1; padding: 0.6rem; border: 1px solid #ccc; border-radius: 6px; }
button { padding: 0.6rem 1rem; border: 0; border-radius: 6px; background: #2563eb; color: #fff; cursor: pointer; }
button.link { background: none; color: #2563eb; padding: 0; }
.error { color: #b91c1c; min-height: 1.2em; }
"#;

pub const APP_JS: &str = r#"(function () {
  const form = document.getElementById('chat-form');
  const input = document.getElementById('message');
  const transcript = document.getElementById('transcript');

  function append(kind, text) {
    const div = document.createElement('div');
    div.className = 'msg ' + kind;
    div.textContent = text;
    transcript.appendChild(div);
    transcript.scrollTop = transcript.scrollHeight;
  }

  form.addEventListener('submit', async function (event) {
    event.preventDefault();
    const text = input.value.trim();
    if (!text) return;
    append('user', text);
    input.value = '';
    try {
      const res = await fetch('/api/chat', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ message: text })
      });
      const data = await res.json();
      if (res.ok && data.reply !== undefined) {
        append('bot', data.reply);
      } else {
        append('error', data.error || 'Request failed');
      }
    } catch (err) {
      append('error', 'Network error: ' + err.message);
    }
  });
})();
"#;
