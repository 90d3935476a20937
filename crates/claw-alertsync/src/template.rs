//! Notification template published next to the Alertmanager config.
//!
//! Receivers reference the named templates below (`claw.title`,
//! `slack.text`, `email.text`). The blob is static and is only rewritten
//! when the config document itself changes.

/// Template title shared by every channel.
pub const TITLE: &str = r#"{{ template "claw.title" . }}"#;

/// Slack message body.
pub const SLACK_TEXT: &str = r#"{{ template "slack.text" . }}"#;

/// Email HTML body.
pub const EMAIL_HTML: &str = r#"{{ template "email.text" . }}"#;

/// Slack attachment color, picked from the first alert's severity.
pub const SLACK_COLOR: &str = r#"{{ if eq (index .Alerts 0).Labels.severity "critical" }}danger{{ else if eq (index .Alerts 0).Labels.severity "warning" }}warning{{ else }}good{{ end }}"#;

/// The template file contents.
pub const NOTIFICATION_TMPL: &str = r#"{{- define "claw.title" -}}
{{- if eq (index .Alerts 0).Labels.alert_type "event" -}}
{{ (index .Alerts 0).Labels.event_type }} event of {{ (index .Alerts 0).Labels.resource_kind }} occurred
{{- else if eq (index .Alerts 0).Labels.alert_type "metric" -}}
The metric {{ (index .Alerts 0).Labels.alert_name }} crossed the threshold
{{- else -}}
{{ (index .Alerts 0).Labels.alert_name }} is firing
{{- end -}}
{{- end -}}

{{- define "slack.text" -}}
{{ range .Alerts -}}
*Alert:* {{ .Labels.alert_name }}
*Severity:* {{ .Labels.severity }}
*Group:* {{ .Labels.group_id }}
{{ if .Labels.cluster_name }}*Cluster:* {{ .Labels.cluster_name }}
{{ end -}}
{{ if .Labels.project_name }}*Project:* {{ .Labels.project_name }}
{{ end -}}
{{ if .Labels.expression }}*Expression:* {{ .Labels.expression }}
{{ end -}}
{{ if .Annotations.current_value }}*Current value:* {{ .Annotations.current_value }}
{{ end -}}
*Started at:* {{ .StartsAt }}
{{ end -}}
{{- end -}}

{{- define "email.text" -}}
<html><body>
{{ range .Alerts -}}
<p><b>Alert:</b> {{ .Labels.alert_name }}<br>
<b>Severity:</b> {{ .Labels.severity }}<br>
<b>Group:</b> {{ .Labels.group_id }}<br>
{{ if .Labels.cluster_name }}<b>Cluster:</b> {{ .Labels.cluster_name }}<br>{{ end }}
{{ if .Labels.project_name }}<b>Project:</b> {{ .Labels.project_name }}<br>{{ end }}
{{ if .Labels.expression }}<b>Expression:</b> {{ .Labels.expression }}<br>{{ end }}
{{ if .Annotations.current_value }}<b>Current value:</b> {{ .Annotations.current_value }}<br>{{ end }}
<b>Started at:</b> {{ .StartsAt }}</p>
{{ end -}}
</body></html>
{{- end -}}
"#;
